//! Configuration loading and management

use crate::core::entity::ObjectType;
use crate::core::error::LinkHeaderError;
use crate::core::field::FieldDefinition;
use crate::core::rest::RestResourceConfig;
use crate::server::access::PolicyAccessChecker;
use crate::server::registry::{RouteDefinition, RouteRegistry};
use anyhow::Result;
use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Header set by the dynamic page cache on responses it served
pub const DEFAULT_DYNAMIC_CACHE_HEADER: &str = "x-dynamic-cache";

/// Field definitions of one bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFieldsConfig {
    /// Entity type (e.g., "node")
    pub entity_type: String,

    /// Bundle (e.g., "article")
    pub bundle: String,

    /// Fields in their natural order
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Access policies, as policy strings ("public", "authenticated", "role:editor"...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Policy applied when nothing more specific is configured
    #[serde(default = "default_access_policy")]
    pub default: String,

    /// Entity type -> view policy
    #[serde(default)]
    pub entities: HashMap<String, String>,

    /// Route name -> access policy
    #[serde(default)]
    pub routes: HashMap<String, String>,
}

fn default_access_policy() -> String {
    "public".to_string()
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            default: default_access_policy(),
            entities: HashMap::new(),
            routes: HashMap::new(),
        }
    }
}

/// Complete configuration of the link header filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkHeaderConfig {
    /// Scheme and host prepended to generated paths (e.g., "https://example.org")
    pub base_url: String,

    /// Object types whose responses are decorated
    #[serde(default = "default_object_types")]
    pub object_types: Vec<ObjectType>,

    /// Response header whose `HIT` value marks a dynamically cached response
    #[serde(default = "default_dynamic_cache_header")]
    pub dynamic_cache_header: String,

    /// Application routes
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,

    /// Field definitions per bundle
    #[serde(default)]
    pub fields: Vec<BundleFieldsConfig>,

    /// REST resource configurations
    #[serde(default)]
    pub rest_resources: Vec<RestResourceConfig>,

    /// Access policies
    #[serde(default)]
    pub access: AccessConfig,
}

fn default_object_types() -> Vec<ObjectType> {
    ObjectType::ALL.to_vec()
}

fn default_dynamic_cache_header() -> String {
    DEFAULT_DYNAMIC_CACHE_HEADER.to_string()
}

impl LinkHeaderConfig {
    /// Create an empty configuration for a site
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            object_types: default_object_types(),
            dynamic_cache_header: default_dynamic_cache_header(),
            routes: Vec::new(),
            fields: Vec::new(),
            rest_resources: Vec::new(),
            access: AccessConfig::default(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> Result<(), LinkHeaderError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            LinkHeaderError::config(format!("Invalid base_url '{}': {}", self.base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.host().is_none() {
            return Err(LinkHeaderError::config(format!(
                "base_url '{}' must be an absolute http(s) URL with a host",
                self.base_url
            )));
        }

        HeaderName::from_bytes(self.dynamic_cache_header.as_bytes()).map_err(|_| {
            LinkHeaderError::config(format!(
                "dynamic_cache_header '{}' is not a valid header name",
                self.dynamic_cache_header
            ))
        })?;

        let mut object_types = HashSet::new();
        for object_type in &self.object_types {
            if !object_types.insert(object_type) {
                return Err(LinkHeaderError::config(format!(
                    "Object type '{}' is listed twice",
                    object_type
                )));
            }
        }

        let mut bundles = HashSet::new();
        for bundle in &self.fields {
            if !bundles.insert((&bundle.entity_type, &bundle.bundle)) {
                return Err(LinkHeaderError::config(format!(
                    "Fields of bundle '{}.{}' are declared twice",
                    bundle.entity_type, bundle.bundle
                )));
            }
        }

        let mut resources = HashSet::new();
        for resource in &self.rest_resources {
            if !resources.insert(&resource.id) {
                return Err(LinkHeaderError::config(format!(
                    "REST resource '{}' is declared twice",
                    resource.id
                )));
            }
        }

        PolicyAccessChecker::from_config(&self.access)?;

        // Route name uniqueness is checked by the registry itself
        self.route_registry().map(|_| ())
    }

    /// Build the route registry, including derived REST routes
    pub fn route_registry(&self) -> Result<RouteRegistry, LinkHeaderError> {
        RouteRegistry::from_routes(self.routes.iter().cloned())?
            .with_rest_routes(&self.rest_resources)
    }
}
