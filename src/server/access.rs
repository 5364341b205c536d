//! Policy-based access checks
//!
//! Maps entity types and route names to [`AuthPolicy`] strings, the same
//! policy vocabulary used in YAML configuration.

use crate::config::AccessConfig;
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::entity::EntityReference;
use crate::core::error::LinkHeaderError;
use crate::core::service::AccessChecker;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Access checker driven by configured policies
pub struct PolicyAccessChecker {
    default: AuthPolicy,
    entities: HashMap<String, AuthPolicy>,
    routes: HashMap<String, AuthPolicy>,
}

impl PolicyAccessChecker {
    /// Create a checker applying `default` where nothing more specific is set
    pub fn new(default: AuthPolicy) -> Self {
        Self {
            default,
            entities: HashMap::new(),
            routes: HashMap::new(),
        }
    }

    /// Build from the `access` configuration section
    ///
    /// Fails on the first policy string that is not a known policy.
    pub fn from_config(config: &AccessConfig) -> Result<Self, LinkHeaderError> {
        Ok(Self {
            default: config.default.parse()?,
            entities: parse_policies(&config.entities)?,
            routes: parse_policies(&config.routes)?,
        })
    }

    /// Policy for viewing entities of a type
    pub fn with_entity_policy(
        mut self,
        entity_type: impl Into<String>,
        policy: AuthPolicy,
    ) -> Self {
        self.entities.insert(entity_type.into(), policy);
        self
    }

    /// Policy for accessing a route
    pub fn with_route_policy(
        mut self,
        route_name: impl Into<String>,
        policy: AuthPolicy,
    ) -> Self {
        self.routes.insert(route_name.into(), policy);
        self
    }
}

fn parse_policies(
    policies: &HashMap<String, String>,
) -> Result<HashMap<String, AuthPolicy>, LinkHeaderError> {
    policies
        .iter()
        .map(|(key, policy)| {
            let policy: AuthPolicy = policy.parse()?;
            Ok::<_, LinkHeaderError>((key.clone(), policy))
        })
        .collect()
}

impl Default for PolicyAccessChecker {
    fn default() -> Self {
        Self::new(AuthPolicy::Public)
    }
}

#[async_trait]
impl AccessChecker for PolicyAccessChecker {
    async fn can_view(&self, entity: &EntityReference, user: &AuthContext) -> Result<bool> {
        let policy = self.entities.get(&entity.entity_type).unwrap_or(&self.default);
        Ok(policy.check(user))
    }

    async fn can_access_route(
        &self,
        route_name: &str,
        _params: &[(&str, &str)],
        user: &AuthContext,
    ) -> Result<bool> {
        let policy = self.routes.get(route_name).unwrap_or(&self.default);
        Ok(policy.check(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn editor() -> AuthContext {
        AuthContext::User {
            user_id: Uuid::new_v4(),
            roles: vec!["editor".to_string()],
        }
    }

    #[tokio::test]
    async fn test_entity_policies() {
        let checker = PolicyAccessChecker::default()
            .with_entity_policy("user", AuthPolicy::Authenticated);

        let profile = EntityReference::new("user", "5");
        let term = EntityReference::new("taxonomy_term", "9");

        assert!(!checker.can_view(&profile, &AuthContext::Anonymous).await.unwrap());
        assert!(checker.can_view(&profile, &editor()).await.unwrap());
        assert!(checker.can_view(&term, &AuthContext::Anonymous).await.unwrap());
    }

    #[tokio::test]
    async fn test_route_policies() {
        let checker = PolicyAccessChecker::new(AuthPolicy::Authenticated)
            .with_route_policy(
                "rest.entity.node.GET.xml",
                AuthPolicy::HasRole(vec!["syndication".into()]),
            );

        let params = [("node", "1")];
        assert!(
            !checker
                .can_access_route("rest.entity.node.GET.xml", &params, &editor())
                .await
                .unwrap()
        );
        assert!(
            checker
                .can_access_route("rest.entity.node.GET.json", &params, &editor())
                .await
                .unwrap()
        );
        assert!(
            !checker
                .can_access_route("rest.entity.node.GET.json", &params, &AuthContext::Anonymous)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_from_config() {
        let mut config = AccessConfig::default();
        config.entities.insert("media".to_string(), "deny".to_string());
        config
            .routes
            .insert("rest.entity.node.GET.json".to_string(), "authenticated".to_string());
        let checker = PolicyAccessChecker::from_config(&config).unwrap();

        let anon = AuthContext::Anonymous;
        assert!(checker.can_view(&EntityReference::new("node", "1"), &anon).await.unwrap());
        assert!(!checker.can_view(&EntityReference::new("media", "1"), &anon).await.unwrap());
        assert!(
            !checker
                .can_access_route("rest.entity.node.GET.json", &[], &anon)
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_from_config_rejects_unknown_policy() {
        let mut config = AccessConfig::default();
        config.entities.insert("user".to_string(), "owner".to_string());

        let err = PolicyAccessChecker::from_config(&config).err().expect("owner is unknown");
        assert!(matches!(err, LinkHeaderError::Config(_)));
    }
}
