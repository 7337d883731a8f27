use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{FindOneOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult, TemplateStore};
use crate::config::Config;
use crate::models::Template;

const DUPLICATE_KEY_CODE: i32 = 11000;
const NAME_LOOKUP_INDEX: &str = "template_name_registered_at_id";

/// Stored shape of a template
///
/// Same fields as [`Template`] but with a BSON date so `registered_at` sorts
/// natively in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TemplateDocument {
    #[serde(rename = "_id")]
    id: String,
    template_name: String,
    encoded_image: String,
    registered_at: BsonDateTime,
}

impl From<&Template> for TemplateDocument {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            template_name: template.template_name.clone(),
            encoded_image: template.encoded_image.clone(),
            registered_at: BsonDateTime::from_chrono(template.registered_at),
        }
    }
}

impl From<TemplateDocument> for Template {
    fn from(document: TemplateDocument) -> Self {
        let registered_at: DateTime<Utc> = document.registered_at.to_chrono();
        Self {
            id: document.id,
            template_name: document.template_name,
            encoded_image: document.encoded_image,
            registered_at,
        }
    }
}

/// Shareable MongoDB handle for use across async handlers
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    templates: Collection<TemplateDocument>,
}

impl MongoStore {
    /// Connect to MongoDB and select the configured collection
    ///
    /// The driver connects lazily, so a bad host shows up on the first
    /// operation (see [`MongoStore::initialize_indexes`]) rather than here.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        tracing::info!("Connecting to MongoDB at: {}", config.mongodb_uri);

        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("Failed to create MongoDB client")?;

        let templates = client
            .database(&config.mongodb_database)
            .collection::<TemplateDocument>(&config.mongodb_collection);

        tracing::info!(
            "Using MongoDB collection: {}.{}",
            config.mongodb_database,
            config.mongodb_collection
        );

        Ok(Self { client, templates })
    }

    /// Ensure the index backing name lookups exists
    ///
    /// Covers the `template_name` filter and the `(registered_at, _id)`
    /// tie-break sort. Not unique: duplicate names are allowed. Safe to call
    /// repeatedly.
    pub async fn initialize_indexes(&self) -> anyhow::Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "template_name": 1, "registered_at": 1, "_id": 1 })
            .options(
                IndexOptions::builder()
                    .name(NAME_LOOKUP_INDEX.to_string())
                    .build(),
            )
            .build();

        self.templates
            .create_index(index, None)
            .await
            .context("Failed to create template_name index")?;

        tracing::info!("Created index {} on templates collection", NAME_LOOKUP_INDEX);
        Ok(())
    }

    /// Close the underlying client, waiting for in-flight operations
    pub async fn shutdown(self) {
        tracing::info!("Closing MongoDB client");
        self.client.shutdown().await;
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl TemplateStore for MongoStore {
    async fn insert(&self, template: &Template) -> StoreResult<String> {
        let document = TemplateDocument::from(template);

        match self.templates.insert_one(&document, None).await {
            Ok(result) => {
                tracing::debug!("Inserted template with id: {}", result.inserted_id);
                Ok(document.id)
            }
            Err(err) if is_duplicate_key(&err) => Err(StoreError::DuplicateId(document.id)),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to insert template into MongoDB")
                .into()),
        }
    }

    async fn find_first_by_name(&self, template_name: &str) -> StoreResult<Option<Template>> {
        // _id breaks ties between records stamped in the same millisecond
        let options = FindOneOptions::builder()
            .sort(doc! { "registered_at": 1, "_id": 1 })
            .build();

        let found = self
            .templates
            .find_one(doc! { "template_name": template_name }, options)
            .await
            .context("Failed to query template from MongoDB")?;

        match found {
            Some(document) => {
                tracing::debug!("Found template {} with id: {}", template_name, document.id);
                Ok(Some(document.into()))
            }
            None => {
                tracing::debug!("Template not found: {}", template_name);
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB ping failed")?;

        tracing::debug!("Health check ping succeeded");
        Ok(())
    }
}
