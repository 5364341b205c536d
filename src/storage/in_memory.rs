//! In-memory collaborators for testing, development and static sites

use crate::config::BundleFieldsConfig;
use crate::core::entity::{ContentEntity, EntityLoader, EntityReference};
use crate::core::field::{FieldDefinition, FieldDefinitionProvider};
use crate::core::rest::{RestConfigStore, RestResourceConfig};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A content entity held in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub entity_type: String,
    pub bundle: String,
    pub id: String,

    /// Field name -> referenced entities, in stored order
    #[serde(default)]
    pub references: IndexMap<String, Vec<EntityReference>>,
}

impl StoredEntity {
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            id: id.into(),
            references: IndexMap::new(),
        }
    }

    /// Append a reference to a field
    pub fn with_reference(mut self, field_name: &str, target: EntityReference) -> Self {
        self.references
            .entry(field_name.to_string())
            .or_default()
            .push(target);
        self
    }
}

impl ContentEntity for StoredEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn bundle(&self) -> &str {
        &self.bundle
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn referenced_entities(&self, field_name: &str) -> Vec<EntityReference> {
        self.references.get(field_name).cloned().unwrap_or_default()
    }
}

/// In-memory entity store
///
/// Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    entities: Arc<RwLock<HashMap<(String, String), Arc<StoredEntity>>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity
    pub fn insert(&self, entity: StoredEntity) -> Result<()> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        entities.insert(
            (entity.entity_type.clone(), entity.id.clone()),
            Arc::new(entity),
        );
        Ok(())
    }

    /// Remove an entity, returning whether it existed
    pub fn remove(&self, entity_type: &str, id: &str) -> Result<bool> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(entities
            .remove(&(entity_type.to_string(), id.to_string()))
            .is_some())
    }
}

#[async_trait]
impl EntityLoader for InMemoryEntityStore {
    async fn load(&self, entity_type: &str, id: &str) -> Result<Option<Arc<dyn ContentEntity>>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entities
            .get(&(entity_type.to_string(), id.to_string()))
            .map(|entity| entity.clone() as Arc<dyn ContentEntity>))
    }
}

/// Field definitions held in memory, keyed by (entity type, bundle)
#[derive(Debug, Clone, Default)]
pub struct InMemoryFieldDefinitions {
    bundles: HashMap<(String, String), Vec<FieldDefinition>>,
}

impl InMemoryFieldDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `fields` configuration section
    pub fn from_config(bundles: &[BundleFieldsConfig]) -> Self {
        let mut definitions = Self::new();
        for bundle in bundles {
            for field in &bundle.fields {
                definitions.add_field(&bundle.entity_type, &bundle.bundle, field.clone());
            }
        }
        definitions
    }

    /// Append a field to a bundle
    pub fn add_field(&mut self, entity_type: &str, bundle: &str, field: FieldDefinition) {
        self.bundles
            .entry((entity_type.to_string(), bundle.to_string()))
            .or_default()
            .push(field);
    }

    /// Builder-style variant of [`Self::add_field`]
    pub fn with_field(mut self, entity_type: &str, bundle: &str, field: FieldDefinition) -> Self {
        self.add_field(entity_type, bundle, field);
        self
    }
}

#[async_trait]
impl FieldDefinitionProvider for InMemoryFieldDefinitions {
    async fn field_definitions(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> Result<Vec<FieldDefinition>> {
        Ok(self
            .bundles
            .get(&(entity_type.to_string(), bundle.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// REST resource configurations held in memory, keyed by resource id
#[derive(Debug, Clone, Default)]
pub struct InMemoryRestConfigStore {
    resources: HashMap<String, RestResourceConfig>,
}

impl InMemoryRestConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_resources(resources: impl IntoIterator<Item = RestResourceConfig>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|resource| (resource.id.clone(), resource))
                .collect(),
        }
    }
}

#[async_trait]
impl RestConfigStore for InMemoryRestConfigStore {
    async fn load(&self, resource_id: &str) -> Result<Option<RestResourceConfig>> {
        Ok(self.resources.get(resource_id).cloned())
    }
}
