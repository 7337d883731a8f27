use std::env;
use anyhow::{bail, Context, Result};

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGODB_DATABASE: &str = "docs";
const DEFAULT_MONGODB_COLLECTION: &str = "receipts";

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub mongodb_collection: String,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// `from_env` is a thin wrapper over this so the parsing rules can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = lookup("MONGODB_URI")
            .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());

        let mongodb_database = non_empty(
            "MONGODB_DATABASE",
            lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
        )?;

        let mongodb_collection = non_empty(
            "MONGODB_COLLECTION",
            lookup("MONGODB_COLLECTION").unwrap_or_else(|| DEFAULT_MONGODB_COLLECTION.to_string()),
        )?;

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            mongodb_uri,
            mongodb_database,
            mongodb_collection,
            service_port,
            service_host,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  MongoDB URI: {}", self.mongodb_uri);
        tracing::info!("  MongoDB database: {}", self.mongodb_database);
        tracing::info!("  MongoDB collection: {}", self.mongodb_collection);
        tracing::info!("  Service listening on: {}", self.bind_address());
    }
}

fn non_empty(name: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        bail!("{} must not be empty", name);
    }
    Ok(value)
}
