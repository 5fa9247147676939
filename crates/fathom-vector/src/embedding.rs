//! Convenience builder for the `EmbeddingRecord` shape spec.md §4.5 defines,
//! expressed as a [`VectorRecord`] with a fixed metadata vocabulary so every
//! caller agrees on key names for filtering.

use chrono::{DateTime, Utc};
use fathom_types::VectorRecord;
use serde_json::json;

/// `entityType` values spec.md §4.5 enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Pattern,
    Skill,
    Content,
    Domain,
}

impl EntityType {
    fn as_str(&self) -> &'static str {
        match self {
            EntityType::Pattern => "pattern",
            EntityType::Skill => "skill",
            EntityType::Content => "content",
            EntityType::Domain => "domain",
        }
    }
}

pub struct EmbeddingRecordBuilder {
    id: String,
    embedding: Vec<f32>,
    model: String,
    version: String,
    entity_type: EntityType,
    domain: Option<String>,
    tenant_id: Option<String>,
    text: Option<String>,
    created_at: DateTime<Utc>,
}

impl EmbeddingRecordBuilder {
    pub fn new(
        id: impl Into<String>,
        embedding: Vec<f32>,
        model: impl Into<String>,
        version: impl Into<String>,
        entity_type: EntityType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            embedding,
            model: model.into(),
            version: version.into(),
            entity_type,
            domain: None,
            tenant_id: None,
            text: None,
            created_at,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn build(self) -> VectorRecord {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("model".to_string(), json!(self.model));
        metadata.insert("version".to_string(), json!(self.version));
        metadata.insert("entityType".to_string(), json!(self.entity_type.as_str()));
        metadata.insert("createdAt".to_string(), json!(self.created_at.to_rfc3339()));
        if let Some(domain) = self.domain {
            metadata.insert("domain".to_string(), json!(domain));
        }
        if let Some(tenant_id) = self.tenant_id {
            metadata.insert("tenantId".to_string(), json!(tenant_id));
        }
        if let Some(text) = self.text {
            metadata.insert("text".to_string(), json!(text));
        }

        VectorRecord {
            id: self.id,
            embedding: self.embedding,
            metadata,
        }
    }
}
