//! Subject resolution
//!
//! Decides whether a response is about a node or media entity and, if so,
//! which one. Checks run cheapest first; most responses are rejected before
//! any entity is loaded.

use crate::core::entity::{ContentEntity, EntityLoader, ObjectType};
use crate::server::registry::RouteMatch;
use anyhow::Result;
use axum::http::{HeaderMap, HeaderName, Method, Response, StatusCode};
use std::sync::Arc;

/// Value of the dynamic cache header on responses served from cache
pub const CACHE_HIT: &str = "HIT";

/// The parts of a response the resolver inspects
#[derive(Debug, Clone, Copy)]
pub struct ResponseHead<'a> {
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
}

impl<'a> ResponseHead<'a> {
    pub fn new(status: StatusCode, headers: &'a HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn of<B>(response: &'a Response<B>) -> Self {
        Self::new(response.status(), response.headers())
    }
}

/// Resolves the subject entity of a response
#[derive(Clone)]
pub struct SubjectResolver {
    entities: Arc<dyn EntityLoader>,
    dynamic_cache_header: HeaderName,
}

impl SubjectResolver {
    pub fn new(entities: Arc<dyn EntityLoader>, dynamic_cache_header: HeaderName) -> Self {
        Self {
            entities,
            dynamic_cache_header,
        }
    }

    /// Resolve the subject entity
    ///
    /// # Arguments
    /// * `response` - Status and headers of the outgoing response
    /// * `route` - The matched route, if any
    /// * `object_type` - Route parameter / entity type to look for ("node" or "media")
    ///
    /// # Returns
    /// The entity bound to the `object_type` route parameter, or `None` when
    /// the response is not eligible. Only entity loading can fail.
    pub async fn resolve(
        &self,
        response: ResponseHead<'_>,
        route: Option<&RouteMatch>,
        object_type: &str,
    ) -> Result<Option<Arc<dyn ContentEntity>>> {
        let Ok(object_type) = object_type.parse::<ObjectType>() else {
            return Ok(None);
        };

        if self.is_cache_hit(response.headers) {
            tracing::trace!("Response served from dynamic cache, skipping");
            return Ok(None);
        }

        if response.status != StatusCode::OK {
            return Ok(None);
        }

        let Some(route) = route else {
            return Ok(None);
        };
        if !(route.route.allows(&Method::GET) || route.route.allows(&Method::HEAD)) {
            return Ok(None);
        }

        let parameter = object_type.as_str();
        let Some(entity_type) = route.route.parameter_entity_type(parameter) else {
            return Ok(None);
        };
        let Some(raw_id) = route.param(parameter) else {
            return Ok(None);
        };

        let Some(entity) = self.entities.load(entity_type, raw_id).await? else {
            tracing::trace!(
                route = %route.name(),
                entity_id = %raw_id,
                "Route parameter did not resolve"
            );
            return Ok(None);
        };

        // Only node and media entities are ever decorated
        if entity.entity_type() != object_type.as_str() {
            return Ok(None);
        }

        tracing::debug!(
            route = %route.name(),
            entity_type = %entity.entity_type(),
            entity_id = %entity.id(),
            "Resolved link header subject"
        );
        Ok(Some(entity))
    }

    fn is_cache_hit(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(&self.dynamic_cache_header)
            .iter()
            .any(|value| {
                value
                    .to_str()
                    .is_ok_and(|v| v.trim().eq_ignore_ascii_case(CACHE_HIT))
            })
    }
}
