//! LinkHeaderBuilder for fluent assembly of the middleware

use super::access::PolicyAccessChecker;
use super::middleware::LinkHeaderState;
use super::url::RouteUrlGenerator;
use crate::config::LinkHeaderConfig;
use crate::core::error::LinkHeaderError;
use crate::core::{
    AccessChecker, AuthProvider, EntityLoader, FieldDefinitionProvider, NoAuthProvider,
    RestConfigStore, UrlGenerator,
};
use crate::links::decorator::{Collaborators, LinkHeaderDecorator};
use crate::storage::{InMemoryFieldDefinitions, InMemoryRestConfigStore};
use anyhow::Result;
use axum::http::HeaderName;
use std::sync::Arc;

/// Builder for the link header middleware state
///
/// Every collaborator except the entity loader has a default built from the
/// configuration: field definitions, REST resources and access policies are
/// read from it, URLs are generated from its routes and `base_url`, and
/// every request is anonymous.
///
/// # Example
///
/// ```ignore
/// let links = LinkHeaderBuilder::new()
///     .with_config(LinkHeaderConfig::from_yaml_file("links.yaml")?)
///     .with_entity_loader(store)
///     .with_auth_provider(HeaderAuthProvider)
///     .build()?;
///
/// let app = links.apply(Router::new().route("/node/{node}", get(show_node)));
/// ```
pub struct LinkHeaderBuilder {
    config: Option<LinkHeaderConfig>,
    entities: Option<Arc<dyn EntityLoader>>,
    fields: Option<Arc<dyn FieldDefinitionProvider>>,
    rest_config: Option<Arc<dyn RestConfigStore>>,
    access: Option<Arc<dyn AccessChecker>>,
    urls: Option<Arc<dyn UrlGenerator>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl LinkHeaderBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            entities: None,
            fields: None,
            rest_config: None,
            access: None,
            urls: None,
            auth: None,
        }
    }

    /// Set the configuration (required)
    pub fn with_config(mut self, config: LinkHeaderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the loader resolving route parameters to entities (required)
    pub fn with_entity_loader(mut self, loader: impl EntityLoader + 'static) -> Self {
        self.entities = Some(Arc::new(loader));
        self
    }

    /// Replace the configured field definitions
    pub fn with_field_definitions(
        mut self,
        provider: impl FieldDefinitionProvider + 'static,
    ) -> Self {
        self.fields = Some(Arc::new(provider));
        self
    }

    /// Replace the configured REST resources
    ///
    /// REST routes are still derived from the configuration's `rest_resources`.
    pub fn with_rest_config_store(mut self, store: impl RestConfigStore + 'static) -> Self {
        self.rest_config = Some(Arc::new(store));
        self
    }

    /// Replace the configured access policies
    pub fn with_access_checker(mut self, checker: impl AccessChecker + 'static) -> Self {
        self.access = Some(Arc::new(checker));
        self
    }

    /// Replace the route-based URL generator
    pub fn with_url_generator(mut self, generator: impl UrlGenerator + 'static) -> Self {
        self.urls = Some(Arc::new(generator));
        self
    }

    /// Set how the acting user is extracted from requests
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Build the middleware state
    pub fn build(self) -> Result<LinkHeaderState> {
        let config = self.config.ok_or_else(|| {
            LinkHeaderError::config("LinkHeaderConfig is required. Call .with_config()")
        })?;
        config.validate()?;

        let entities = self.entities.ok_or_else(|| {
            LinkHeaderError::config("EntityLoader is required. Call .with_entity_loader()")
        })?;

        let routes = Arc::new(config.route_registry()?);

        let access: Arc<dyn AccessChecker> = match self.access {
            Some(access) => access,
            None => Arc::new(PolicyAccessChecker::from_config(&config.access)?),
        };
        let urls: Arc<dyn UrlGenerator> = match self.urls {
            Some(urls) => urls,
            None => Arc::new(RouteUrlGenerator::new(&config.base_url, routes.clone())?),
        };

        let collaborators = Collaborators {
            entities,
            fields: self.fields.unwrap_or_else(|| {
                Arc::new(InMemoryFieldDefinitions::from_config(&config.fields))
            }),
            rest_config: self.rest_config.unwrap_or_else(|| {
                Arc::new(InMemoryRestConfigStore::from_resources(
                    config.rest_resources.iter().cloned(),
                ))
            }),
            access,
            urls,
        };

        let cache_header = HeaderName::from_bytes(config.dynamic_cache_header.as_bytes())
            .map_err(|e| LinkHeaderError::config(format!("Invalid dynamic_cache_header: {}", e)))?;

        let decorators = config
            .object_types
            .iter()
            .map(|object_type| {
                LinkHeaderDecorator::new(*object_type, &collaborators, cache_header.clone())
            })
            .collect();

        tracing::debug!(
            routes = routes.len(),
            object_types = ?config.object_types,
            "Link header middleware configured"
        );

        let auth = self.auth.unwrap_or_else(|| Arc::new(NoAuthProvider));
        Ok(LinkHeaderState::new(routes, auth, decorators))
    }
}

impl Default for LinkHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
