//! Service traits for access checks and URL generation
//!
//! Implementations are provided by the surrounding application. The crate
//! ships configuration-driven ones in [`crate::server`].

use crate::core::auth::AuthContext;
use crate::core::entity::EntityReference;
use anyhow::Result;
use async_trait::async_trait;

/// Access decisions for the acting user
#[async_trait]
pub trait AccessChecker: Send + Sync {
    /// Check if the user may view a referenced entity
    async fn can_view(&self, entity: &EntityReference, user: &AuthContext) -> Result<bool>;

    /// Check if the user may access a named route with the given parameters
    async fn can_access_route(
        &self,
        route_name: &str,
        params: &[(&str, &str)],
        user: &AuthContext,
    ) -> Result<bool>;
}

/// Absolute URL generation
pub trait UrlGenerator: Send + Sync {
    /// Absolute canonical URL of an entity
    fn entity_url(&self, entity: &EntityReference) -> Result<String>;

    /// Absolute URL of a named route with parameters bound
    fn route_url(&self, route_name: &str, params: &[(&str, &str)]) -> Result<String>;
}
