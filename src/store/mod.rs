//! Persistence for image templates.
//!
//! Handlers only see [`TemplateStore`]; the process wires in [`MongoStore`]
//! and the handler tests use an in-memory store.

pub mod mongo;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Template;

pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this `_id` is already stored
    #[error("Template id {0} already exists")]
    DuplicateId(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Persist a new record and return the id it was stored under.
    async fn insert(&self, template: &Template) -> StoreResult<String>;

    /// Return the earliest-registered record whose name matches exactly.
    async fn find_first_by_name(&self, template_name: &str) -> StoreResult<Option<Template>>;

    async fn health_check(&self) -> StoreResult<()>;
}
