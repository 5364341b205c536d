//! Entity abstractions consumed by the link header filter
//!
//! Entities are owned by the surrounding application. The filter only reads
//! them through [`ContentEntity`] and loads them through [`EntityLoader`].

use crate::core::error::LinkHeaderError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Entity types whose responses receive Link headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Node,
    Media,
}

impl ObjectType {
    /// All decorated object types
    pub const ALL: [ObjectType; 2] = [ObjectType::Node, ObjectType::Media];

    /// The entity type id, which is also the route parameter name
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Node => "node",
            ObjectType::Media => "media",
        }
    }
}

impl FromStr for ObjectType {
    type Err = LinkHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(ObjectType::Node),
            "media" => Ok(ObjectType::Media),
            other => Err(LinkHeaderError::UnknownObjectType(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an entity instance held by a reference field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityReference {
    /// The type of entity (e.g., "user", "taxonomy_term", "media")
    pub entity_type: String,

    /// The entity id as it appears in URLs
    pub id: String,
}

impl EntityReference {
    /// Create a new entity reference
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// A content entity that can be the subject of a response
pub trait ContentEntity: Send + Sync {
    /// Entity type id (e.g., "node")
    fn entity_type(&self) -> &str;

    /// Bundle id (e.g., "article")
    fn bundle(&self) -> &str;

    /// Entity id as it appears in URLs
    fn id(&self) -> &str;

    /// Entities referenced by a field, in stored order
    ///
    /// Unknown fields and empty fields both yield an empty list.
    fn referenced_entities(&self, field_name: &str) -> Vec<EntityReference>;

    /// Reference to this entity
    fn as_reference(&self) -> EntityReference {
        EntityReference::new(self.entity_type(), self.id())
    }
}

/// Loads entities bound to route parameters
#[async_trait]
pub trait EntityLoader: Send + Sync {
    /// Load an entity by type and id
    ///
    /// # Returns
    /// `None` if no such entity exists
    async fn load(&self, entity_type: &str, id: &str) -> Result<Option<Arc<dyn ContentEntity>>>;
}
