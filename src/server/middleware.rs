//! Axum middleware adding Link headers to outgoing responses
//!
//! The middleware must see the response before any caching layer stores its
//! headers. Attach it with [`LinkHeaderState::apply`], which uses
//! `Router::route_layer`, so it sits inside every layer added afterwards
//! with `Router::layer`.
//!
//! Requests that match no GET or HEAD route pass straight through. For the
//! rest, the acting user is only extracted once a response turns out to be
//! eligible for decoration.

use crate::core::auth::AuthProvider;
use crate::core::rest::FORMAT_QUERY_PARAMETER;
use crate::links::decorator::{LinkHeaderDecorator, RequestContext};
use crate::server::registry::{RouteMatch, RouteRegistry};
use axum::Router;
use axum::extract::{FromRequestParts, MatchedPath, Query, RawPathParams, Request, State};
use axum::http::Method;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state of the link header middleware
#[derive(Clone)]
pub struct LinkHeaderState {
    routes: Arc<RouteRegistry>,
    auth: Arc<dyn AuthProvider>,
    decorators: Arc<Vec<LinkHeaderDecorator>>,
}

impl LinkHeaderState {
    pub fn new(
        routes: Arc<RouteRegistry>,
        auth: Arc<dyn AuthProvider>,
        decorators: Vec<LinkHeaderDecorator>,
    ) -> Self {
        Self {
            routes,
            auth,
            decorators: Arc::new(decorators),
        }
    }

    /// Decorators run against every response, in order
    pub fn decorators(&self) -> &[LinkHeaderDecorator] {
        &self.decorators
    }

    /// Attach the middleware to the routes of a router
    ///
    /// Routes added to the router after this call are not decorated.
    ///
    /// # Panics
    ///
    /// Panics if the router has no routes yet (see `Router::route_layer`).
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(
            self.clone(),
            link_header_middleware,
        ))
    }

    /// Capture the matched route of a request that may be decorated
    ///
    /// Returns `None` when no registered GET or HEAD route serves the
    /// request. The acting user is left to be extracted on demand.
    pub async fn request_context(&self, parts: &mut Parts) -> Option<RequestContext> {
        let route = self.match_route(parts).await?;
        if !(route.route.allows(&Method::GET) || route.route.allows(&Method::HEAD)) {
            return None;
        }

        Some(RequestContext::deferred(Some(route), self.auth.clone(), parts))
    }

    async fn match_route(&self, parts: &mut Parts) -> Option<RouteMatch> {
        let template = parts.extensions.get::<MatchedPath>()?.as_str().to_string();

        let format = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(mut query)| query.remove(FORMAT_QUERY_PARAMETER));

        let route = self
            .routes
            .match_request(&template, &parts.method, format.as_deref())?;

        let raw_params = RawPathParams::from_request_parts(parts, &()).await.ok()?;
        let params = raw_params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Some(RouteMatch::new(route, params))
    }
}

/// Run the request, then let every decorator append its Link headers
///
/// Decoration failures are logged and the response is sent undecorated.
pub async fn link_header_middleware(
    State(state): State<LinkHeaderState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let Some(context) = state.request_context(&mut parts).await else {
        return next.run(Request::from_parts(parts, body)).await;
    };

    let mut response = next.run(Request::from_parts(parts, body)).await;

    for decorator in state.decorators.iter() {
        match decorator.decorate(&mut response, &context).await {
            Ok(0) => {}
            Ok(added) => {
                tracing::debug!(
                    object_type = %decorator.object_type(),
                    count = added,
                    "Added Link headers"
                );
            }
            Err(e) => {
                tracing::warn!(
                    object_type = %decorator.object_type(),
                    route = context.route.as_ref().map(|r| r.name()).unwrap_or_default(),
                    error = %e,
                    "Failed to add Link headers"
                );
            }
        }
    }

    response
}
