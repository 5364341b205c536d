//! REST resource configuration and serialization formats

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Query parameter selecting a serialization format
pub const FORMAT_QUERY_PARAMETER: &str = "_format";

/// Serialization formats that can be advertised as alternate representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationFormat {
    Json,
    JsonLd,
    HalJson,
    Xml,
}

impl SerializationFormat {
    /// Map a format id to a known format
    ///
    /// Returns `None` for formats without a MIME mapping.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "json" => Some(SerializationFormat::Json),
            "jsonld" => Some(SerializationFormat::JsonLd),
            "hal_json" => Some(SerializationFormat::HalJson),
            "xml" => Some(SerializationFormat::Xml),
            _ => None,
        }
    }

    /// The format id used in `_format` and route names
    pub fn id(&self) -> &'static str {
        match self {
            SerializationFormat::Json => "json",
            SerializationFormat::JsonLd => "jsonld",
            SerializationFormat::HalJson => "hal_json",
            SerializationFormat::Xml => "xml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SerializationFormat::Json => "application/json",
            SerializationFormat::JsonLd => "application/ld+json",
            SerializationFormat::HalJson => "application/hal+json",
            SerializationFormat::Xml => "application/xml",
        }
    }
}

/// Per-method settings of a REST resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestMethodConfig {
    /// Serialization formats accepted for this method, in declared order
    #[serde(default)]
    pub formats: Vec<String>,
}

/// REST exposure of one resource (e.g., "entity.node")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestResourceConfig {
    /// Resource id, `entity.<entity type>` for entity resources
    pub id: String,

    /// Method name (e.g., "GET") -> method settings
    #[serde(default)]
    pub methods: IndexMap<String, RestMethodConfig>,
}

impl RestResourceConfig {
    /// Resource id for an entity type
    pub fn entity_resource_id(entity_type: &str) -> String {
        format!("entity.{}", entity_type)
    }

    /// Create an entity resource exposing GET in the given formats
    pub fn for_entity_get(entity_type: &str, formats: &[&str]) -> Self {
        let mut methods = IndexMap::new();
        methods.insert(
            "GET".to_string(),
            RestMethodConfig {
                formats: formats.iter().map(|f| f.to_string()).collect(),
            },
        );
        Self {
            id: Self::entity_resource_id(entity_type),
            methods,
        }
    }

    /// The entity type this resource exposes, if it is an entity resource
    pub fn entity_type(&self) -> Option<&str> {
        self.id.strip_prefix("entity.")
    }

    /// Formats supported by a method (case-insensitive), in declared order
    pub fn supported_formats(&self, method: &str) -> &[String] {
        self.methods
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(method))
            .map(|(_, config)| config.formats.as_slice())
            .unwrap_or(&[])
    }

    /// Formats supported for GET
    pub fn supported_get_formats(&self) -> &[String] {
        self.supported_formats("GET")
    }
}

/// Name of the REST route serving an entity type in a format
pub fn rest_route_name(entity_type: &str, format: &str) -> String {
    format!("rest.entity.{}.GET.{}", entity_type, format)
}

/// Storage for REST resource configuration
#[async_trait]
pub trait RestConfigStore: Send + Sync {
    /// Load a resource configuration by id (e.g., "entity.node")
    ///
    /// # Returns
    /// `None` when the resource is not exposed over REST
    async fn load(&self, resource_id: &str) -> Result<Option<RestResourceConfig>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_table() {
        let table = [
            ("json", "application/json"),
            ("jsonld", "application/ld+json"),
            ("hal_json", "application/hal+json"),
            ("xml", "application/xml"),
        ];
        for (id, mime) in table {
            let format = SerializationFormat::from_id(id).unwrap();
            assert_eq!(format.mime_type(), mime);
            assert_eq!(format.id(), id);
        }
    }

    #[test]
    fn test_unknown_formats() {
        assert_eq!(SerializationFormat::from_id("bogus"), None);
        assert_eq!(SerializationFormat::from_id("JSON"), None);
        assert_eq!(SerializationFormat::from_id("csv"), None);
    }

    #[test]
    fn test_supported_get_formats() {
        let config = RestResourceConfig::for_entity_get("node", &["json", "xml"]);
        assert_eq!(config.id, "entity.node");
        assert_eq!(config.entity_type(), Some("node"));
        assert_eq!(config.supported_get_formats(), ["json", "xml"]);
        assert!(config.supported_formats("POST").is_empty());
    }

    #[test]
    fn test_method_lookup_is_case_insensitive() {
        let yaml = "id: entity.media\nmethods:\n  get:\n    formats: [hal_json]\n";
        let config: RestResourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.supported_get_formats(), ["hal_json"]);
    }

    #[test]
    fn test_rest_route_name() {
        assert_eq!(rest_route_name("node", "json"), "rest.entity.node.GET.json");
    }
}
