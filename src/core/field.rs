//! Field metadata for content entity bundles

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Field type whose values point at other entities
pub const ENTITY_REFERENCE: &str = "entity_reference";

/// Describes one field on an entity bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Machine name (e.g., "field_author")
    pub name: String,

    /// Field type (e.g., "entity_reference", "string")
    #[serde(rename = "type")]
    pub field_type: String,

    /// Human-readable label (e.g., "Author")
    pub label: String,

    /// Built-in field defined by the entity type rather than the bundle
    #[serde(default)]
    pub base_field: bool,
}

impl FieldDefinition {
    /// Create a bundle-configured (non-base) field
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: label.into(),
            base_field: false,
        }
    }

    /// Create a bundle-configured entity reference field
    pub fn entity_reference(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, ENTITY_REFERENCE, label)
    }

    /// Mark the field as a base field
    pub fn into_base_field(mut self) -> Self {
        self.base_field = true;
        self
    }

    /// Check if this field is a bundle-configured entity reference
    ///
    /// Only these fields produce `rel="related"` links.
    pub fn is_link_source(&self) -> bool {
        !self.base_field && self.field_type == ENTITY_REFERENCE
    }
}

/// Provides field definitions per (entity type, bundle)
#[async_trait]
pub trait FieldDefinitionProvider: Send + Sync {
    /// Field definitions in their natural order
    ///
    /// Unknown bundles yield an empty list.
    async fn field_definitions(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> Result<Vec<FieldDefinition>>;
}
