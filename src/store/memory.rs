use std::sync::Mutex;

use async_trait::async_trait;

use super::{StoreError, StoreResult, TemplateStore};
use crate::models::Template;

/// Vec-backed store used by the handler tests
#[derive(Default)]
pub struct MemoryStore {
    templates: Mutex<Vec<Template>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.lock().unwrap().len()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn insert(&self, template: &Template) -> StoreResult<String> {
        let mut templates = self.templates.lock().unwrap();
        if templates.iter().any(|t| t.id == template.id) {
            return Err(StoreError::DuplicateId(template.id.clone()));
        }
        templates.push(template.clone());
        Ok(template.id.clone())
    }

    async fn find_first_by_name(&self, template_name: &str) -> StoreResult<Option<Template>> {
        let templates = self.templates.lock().unwrap();
        Ok(templates
            .iter()
            .filter(|t| t.template_name == template_name)
            .min_by(|a, b| {
                a.registered_at
                    .cmp(&b.registered_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Store whose every call fails, for exercising the 500/503 paths
pub struct UnreachableStore;

#[async_trait]
impl TemplateStore for UnreachableStore {
    async fn insert(&self, _template: &Template) -> StoreResult<String> {
        Err(anyhow::anyhow!("connection refused").into())
    }

    async fn find_first_by_name(&self, _template_name: &str) -> StoreResult<Option<Template>> {
        Err(anyhow::anyhow!("connection refused").into())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(anyhow::anyhow!("connection refused").into())
    }
}
