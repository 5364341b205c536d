//! `rel="alternate"` links to REST serializations of the subject

use crate::core::auth::AuthContext;
use crate::core::entity::ContentEntity;
use crate::core::rest::{
    FORMAT_QUERY_PARAMETER, RestConfigStore, RestResourceConfig, SerializationFormat,
    rest_route_name,
};
use crate::core::service::{AccessChecker, UrlGenerator};
use crate::links::header::LinkHeaderValue;
use anyhow::Result;
use std::sync::Arc;
use url::Url;

/// Emits one link per GET format of the entity's REST resource
///
/// A format is skipped when it has no known MIME type, when its route is the
/// one currently being served, or when the user cannot access its route.
#[derive(Clone)]
pub struct AlternateLinkGenerator {
    rest_config: Arc<dyn RestConfigStore>,
    access: Arc<dyn AccessChecker>,
    urls: Arc<dyn UrlGenerator>,
}

impl AlternateLinkGenerator {
    pub fn new(
        rest_config: Arc<dyn RestConfigStore>,
        access: Arc<dyn AccessChecker>,
        urls: Arc<dyn UrlGenerator>,
    ) -> Self {
        Self {
            rest_config,
            access,
            urls,
        }
    }

    /// Build the alternate links of an entity
    ///
    /// # Arguments
    /// * `entity` - The subject entity
    /// * `current_route` - Name of the route serving the current request
    /// * `user` - The acting user
    pub async fn generate(
        &self,
        entity: &dyn ContentEntity,
        current_route: &str,
        user: &AuthContext,
    ) -> Result<Vec<LinkHeaderValue>> {
        let entity_type = entity.entity_type();
        let resource_id = RestResourceConfig::entity_resource_id(entity_type);
        let Some(config) = self.rest_config.load(&resource_id).await? else {
            return Ok(Vec::new());
        };

        let params = [(entity_type, entity.id())];
        let mut links = Vec::new();
        for format_id in config.supported_get_formats() {
            let Some(format) = SerializationFormat::from_id(format_id) else {
                tracing::debug!(
                    resource = %resource_id,
                    format = %format_id,
                    "Format has no MIME type, no alternate link"
                );
                continue;
            };

            let route_name = rest_route_name(entity_type, format.id());
            if route_name == current_route {
                continue;
            }

            if !self.access.can_access_route(&route_name, &params, user).await? {
                tracing::trace!(route = %route_name, "Alternate route not accessible");
                continue;
            }

            let url = self.urls.route_url(&route_name, &params)?;
            links.push(LinkHeaderValue::alternate(
                with_format_query(&url, format.id())?,
                format.mime_type(),
            ));
        }

        Ok(links)
    }
}

/// Append `_format=<format>` to the query of a URL
fn with_format_query(url: &str, format: &str) -> Result<String> {
    let mut url = Url::parse(url)?;
    url.query_pairs_mut()
        .append_pair(FORMAT_QUERY_PARAMETER, format);
    Ok(url.into())
}
