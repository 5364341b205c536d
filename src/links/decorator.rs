//! Response decoration for one object type

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::entity::{EntityLoader, ObjectType};
use crate::core::field::FieldDefinitionProvider;
use crate::core::rest::RestConfigStore;
use crate::core::service::{AccessChecker, UrlGenerator};
use crate::links::alternate::AlternateLinkGenerator;
use crate::links::header::LinkHeaderValue;
use crate::links::reference::ReferenceLinkGenerator;
use crate::links::resolver::{ResponseHead, SubjectResolver};
use crate::server::registry::RouteMatch;
use anyhow::Result;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Request, header::LINK};
use axum::response::Response;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// External services the link generators consult
#[derive(Clone)]
pub struct Collaborators {
    pub entities: Arc<dyn EntityLoader>,
    pub fields: Arc<dyn FieldDefinitionProvider>,
    pub rest_config: Arc<dyn RestConfigStore>,
    pub access: Arc<dyn AccessChecker>,
    pub urls: Arc<dyn UrlGenerator>,
}

/// What the request looked like, captured before the handler ran
///
/// The acting user is extracted on first use only, so responses that are
/// never decorated cost no authentication work.
pub struct RequestContext {
    /// The matched route, if the request hit a registered route
    pub route: Option<RouteMatch>,

    user: OnceCell<AuthContext>,
    identity: Option<(Arc<dyn AuthProvider>, Parts)>,
}

impl RequestContext {
    /// Context with an already known acting user
    pub fn new(route: Option<RouteMatch>, user: AuthContext) -> Self {
        Self {
            route,
            user: OnceCell::new_with(Some(user)),
            identity: None,
        }
    }

    /// Context whose acting user is extracted from the request head on demand
    pub fn deferred(
        route: Option<RouteMatch>,
        auth: Arc<dyn AuthProvider>,
        parts: &Parts,
    ) -> Self {
        Self {
            route,
            user: OnceCell::new(),
            identity: Some((auth, snapshot(parts))),
        }
    }

    /// The acting user, extracted at most once
    ///
    /// A failed extraction is treated as anonymous.
    pub async fn user(&self) -> &AuthContext {
        self.user
            .get_or_init(|| async {
                let Some((auth, parts)) = &self.identity else {
                    return AuthContext::Anonymous;
                };
                match auth.extract_context(parts).await {
                    Ok(user) => user,
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            "Could not extract acting user, treating as anonymous"
                        );
                        AuthContext::Anonymous
                    }
                }
            })
            .await
    }
}

/// Copy of a request head; the original moves on to the handler
fn snapshot(parts: &Parts) -> Parts {
    let mut request = Request::new(());
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = parts.uri.clone();
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    *request.extensions_mut() = parts.extensions.clone();
    request.into_parts().0
}

/// Adds Link headers to responses about entities of one object type
#[derive(Clone)]
pub struct LinkHeaderDecorator {
    object_type: ObjectType,
    resolver: SubjectResolver,
    references: ReferenceLinkGenerator,
    alternates: AlternateLinkGenerator,
}

impl LinkHeaderDecorator {
    pub fn new(
        object_type: ObjectType,
        collaborators: &Collaborators,
        dynamic_cache_header: HeaderName,
    ) -> Self {
        Self {
            object_type,
            resolver: SubjectResolver::new(collaborators.entities.clone(), dynamic_cache_header),
            references: ReferenceLinkGenerator::new(
                collaborators.entities.clone(),
                collaborators.fields.clone(),
                collaborators.access.clone(),
                collaborators.urls.clone(),
            ),
            alternates: AlternateLinkGenerator::new(
                collaborators.rest_config.clone(),
                collaborators.access.clone(),
                collaborators.urls.clone(),
            ),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Compute the links for a response without touching it
    ///
    /// Reference links come first, then alternate links. An ineligible
    /// response yields an empty list.
    pub async fn links(
        &self,
        response: ResponseHead<'_>,
        context: &RequestContext,
    ) -> Result<Vec<LinkHeaderValue>> {
        let route = context.route.as_ref();
        let Some(subject) = self
            .resolver
            .resolve(response, route, self.object_type.as_str())
            .await?
        else {
            return Ok(Vec::new());
        };

        let user = context.user().await;
        let mut links = self.references.generate(subject.as_ref(), user).await?;

        // The resolver only yields a subject for a matched route
        if let Some(route) = route {
            links.extend(
                self.alternates
                    .generate(subject.as_ref(), route.name(), user)
                    .await?,
            );
        }

        Ok(links)
    }

    /// Append the Link headers for a response
    ///
    /// All values are computed and encoded before the first header is
    /// appended, so on error the response is left untouched.
    ///
    /// # Returns
    /// The number of `Link` headers appended
    pub async fn decorate(
        &self,
        response: &mut Response,
        context: &RequestContext,
    ) -> Result<usize> {
        let head = ResponseHead::of(response);
        let links = self.links(head, context).await?;

        let values = links
            .iter()
            .map(LinkHeaderValue::to_header_value)
            .collect::<Result<Vec<HeaderValue>, _>>()?;

        let headers = response.headers_mut();
        for value in &values {
            headers.append(LINK, value.clone());
        }

        Ok(values.len())
    }
}
