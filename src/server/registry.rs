//! Route registry
//!
//! Holds the named routes of the application together with what the link
//! header filter needs to know about them: allowed methods, which path
//! parameters carry which entity type, and the `_format` a route serves.

use crate::core::error::LinkHeaderError;
use crate::core::rest::{RestResourceConfig, SerializationFormat, rest_route_name};
use axum::http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prefix of entity parameter declarations (e.g., "entity:node")
pub const ENTITY_PARAMETER_PREFIX: &str = "entity:";

/// Name of the canonical HTML route of an entity type
pub fn canonical_route_name(entity_type: &str) -> String {
    format!("entity.{}.canonical", entity_type)
}

/// A named route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Unique route name (e.g., "entity.node.canonical")
    pub name: String,

    /// Path template in axum syntax (e.g., "/node/{node}")
    pub path: String,

    /// Allowed HTTP methods. Empty means none is declared.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Path parameter name -> parameter type (e.g., "node" -> "entity:node")
    #[serde(default)]
    pub parameters: IndexMap<String, String>,

    /// Required `_format` query value, if the route serves a serialization
    #[serde(default)]
    pub format: Option<String>,
}

impl RouteDefinition {
    /// Create a route answering GET and HEAD
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            methods: vec!["GET".to_string(), "HEAD".to_string()],
            parameters: IndexMap::new(),
            format: None,
        }
    }

    /// Declare a path parameter holding an entity of the given type
    pub fn with_entity_parameter(mut self, parameter: &str, entity_type: &str) -> Self {
        self.parameters.insert(
            parameter.to_string(),
            format!("{}{}", ENTITY_PARAMETER_PREFIX, entity_type),
        );
        self
    }

    /// Replace the allowed methods
    pub fn with_methods(mut self, methods: &[&str]) -> Self {
        self.methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Check if the route declares a method (case-insensitive)
    pub fn allows(&self, method: &Method) -> bool {
        self.methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method.as_str()))
    }

    /// Entity type carried by a path parameter, if it is an entity parameter
    pub fn parameter_entity_type(&self, parameter: &str) -> Option<&str> {
        self.parameters
            .get(parameter)
            .and_then(|t| t.strip_prefix(ENTITY_PARAMETER_PREFIX))
    }
}

/// The route matched for the current request, with its bound parameters
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Matched route
    pub route: Arc<RouteDefinition>,

    /// Raw path parameter values in path order
    pub params: IndexMap<String, String>,
}

impl RouteMatch {
    pub fn new(route: Arc<RouteDefinition>, params: IndexMap<String, String>) -> Self {
        Self { route, params }
    }

    /// Name of the matched route
    pub fn name(&self) -> &str {
        &self.route.name
    }

    /// Raw value bound to a parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Registry of named routes
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: IndexMap<String, Arc<RouteDefinition>>,
}

impl RouteRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            routes: IndexMap::new(),
        }
    }

    /// Register a route
    ///
    /// Route names are unique; registering a name twice is a configuration error.
    pub fn register(&mut self, route: RouteDefinition) -> Result<(), LinkHeaderError> {
        if self.routes.contains_key(&route.name) {
            return Err(LinkHeaderError::config(format!(
                "Route '{}' is registered twice",
                route.name
            )));
        }
        self.routes.insert(route.name.clone(), Arc::new(route));
        Ok(())
    }

    /// Build a registry from a list of routes
    pub fn from_routes(
        routes: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<Self, LinkHeaderError> {
        let mut registry = Self::new();
        for route in routes {
            registry.register(route)?;
        }
        Ok(registry)
    }

    /// Derive the REST GET routes of entity resources
    ///
    /// Each `rest.entity.<type>.GET.<format>` route shares the path and
    /// parameters of `entity.<type>.canonical` and requires `_format=<format>`.
    /// Routes that are already registered are left as they are. A REST
    /// entity resource without a canonical route is a configuration error.
    pub fn with_rest_routes(
        mut self,
        resources: &[RestResourceConfig],
    ) -> Result<Self, LinkHeaderError> {
        for resource in resources {
            let Some(entity_type) = resource.entity_type() else {
                continue;
            };
            let canonical_name = canonical_route_name(entity_type);
            let Some(canonical) = self.get(&canonical_name) else {
                return Err(LinkHeaderError::config(format!(
                    "REST resource '{}' requires route '{}'",
                    resource.id, canonical_name
                )));
            };

            for format in resource.supported_get_formats() {
                if SerializationFormat::from_id(format).is_none() {
                    continue;
                }
                let name = rest_route_name(entity_type, format);
                if self.routes.contains_key(&name) {
                    continue;
                }
                let route = RouteDefinition {
                    name,
                    path: canonical.path.clone(),
                    methods: vec!["GET".to_string(), "HEAD".to_string()],
                    parameters: canonical.parameters.clone(),
                    format: Some(format.clone()),
                };
                self.register(route)?;
            }
        }
        Ok(self)
    }

    /// Get a route by name
    pub fn get(&self, name: &str) -> Option<Arc<RouteDefinition>> {
        self.routes.get(name).cloned()
    }

    /// Find the route serving a request
    ///
    /// Matches the axum path template, the method and the requested `_format`
    /// (`None` only matches routes without a format requirement).
    pub fn match_request(
        &self,
        path_template: &str,
        method: &Method,
        format: Option<&str>,
    ) -> Option<Arc<RouteDefinition>> {
        self.routes
            .values()
            .find(|route| {
                route.path == path_template
                    && route.allows(method)
                    && route.format.as_deref() == format
            })
            .cloned()
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_registry() -> RouteRegistry {
        RouteRegistry::from_routes([
            RouteDefinition::get("entity.node.canonical", "/node/{node}")
                .with_entity_parameter("node", "node"),
            RouteDefinition::get("entity.node.edit_form", "/node/{node}/edit")
                .with_entity_parameter("node", "node")
                .with_methods(&["GET", "POST"]),
            RouteDefinition::get("entity.user.canonical", "/user/{user}")
                .with_entity_parameter("user", "user"),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut registry = create_test_registry();
        let err = registry
            .register(RouteDefinition::get("entity.node.canonical", "/n/{node}"))
            .unwrap_err();
        assert!(matches!(err, LinkHeaderError::Config(_)));
    }

    #[test]
    fn test_parameter_entity_type() {
        let registry = create_test_registry();
        let route = registry.get("entity.node.canonical").unwrap();
        assert_eq!(route.parameter_entity_type("node"), Some("node"));
        assert_eq!(route.parameter_entity_type("user"), None);
    }

    #[test]
    fn test_allows_is_case_insensitive() {
        let route = RouteDefinition::get("r", "/r").with_methods(&["get"]);
        assert!(route.allows(&Method::GET));
        assert!(!route.allows(&Method::HEAD));
    }

    #[test]
    fn test_with_rest_routes() {
        let registry = create_test_registry()
            .with_rest_routes(&[RestResourceConfig::for_entity_get(
                "node",
                &["json", "bogus", "xml"],
            )])
            .unwrap();

        let json = registry.get("rest.entity.node.GET.json").unwrap();
        assert_eq!(json.path, "/node/{node}");
        assert_eq!(json.format.as_deref(), Some("json"));
        assert_eq!(json.parameter_entity_type("node"), Some("node"));
        assert!(registry.get("rest.entity.node.GET.xml").is_some());

        // Unknown formats get no route
        assert!(registry.get("rest.entity.node.GET.bogus").is_none());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_rest_resource_without_canonical_route_is_rejected() {
        let err = create_test_registry()
            .with_rest_routes(&[
                RestResourceConfig::for_entity_get("node", &["json"]),
                RestResourceConfig::for_entity_get("media", &["json"]),
            ])
            .unwrap_err();

        assert!(matches!(err, LinkHeaderError::Config(_)));
        assert!(err.to_string().contains("entity.media.canonical"));
    }

    #[test]
    fn test_match_request_by_format() {
        let registry = create_test_registry()
            .with_rest_routes(&[RestResourceConfig::for_entity_get("node", &["json"])])
            .unwrap();

        let html = registry
            .match_request("/node/{node}", &Method::GET, None)
            .unwrap();
        assert_eq!(html.name, "entity.node.canonical");

        let json = registry
            .match_request("/node/{node}", &Method::HEAD, Some("json"))
            .unwrap();
        assert_eq!(json.name, "rest.entity.node.GET.json");

        assert!(
            registry
                .match_request("/node/{node}", &Method::GET, Some("xml"))
                .is_none()
        );
        assert!(
            registry
                .match_request("/node/{node}", &Method::DELETE, None)
                .is_none()
        );
    }

    #[test]
    fn test_route_match_accessors() {
        let registry = create_test_registry();
        let mut params = IndexMap::new();
        params.insert("node".to_string(), "42".to_string());
        let matched = RouteMatch::new(registry.get("entity.node.canonical").unwrap(), params);
        assert_eq!(matched.name(), "entity.node.canonical");
        assert_eq!(matched.param("node"), Some("42"));
        assert_eq!(matched.param("user"), None);
    }
}
