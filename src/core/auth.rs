//! Authorization system for linkhead
//!
//! Every link is filtered through the acting user's permissions so that
//! headers never disclose entities or endpoints the user cannot reach.
//! Provides:
//! - [`AuthContext`]: the acting user of a request
//! - [`AuthPolicy`]: policy expressions parsed from configuration strings
//! - [`AuthProvider`]: extraction of the acting user from a request

use crate::core::error::LinkHeaderError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::request::Parts;
use std::str::FromStr;
use uuid::Uuid;

/// Header carrying the acting user id when a gateway authenticates upstream
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the acting user's comma-separated roles
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<String> },

    /// System administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    /// Check if the user holds a role
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.iter().any(|r| r == role),
            _ => false,
        }
    }
}

/// Authorization policy for viewing an entity or accessing a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Admin only
    AdminOnly,

    /// Nobody, not even admins
    Deny,
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::HasRole(required_roles) => {
                context.is_admin() || required_roles.iter().any(|r| context.has_role(r))
            }

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::Deny => false,
        }
    }
}

impl FromStr for AuthPolicy {
    type Err = LinkHeaderError;

    /// Parse policy from string (for YAML config)
    ///
    /// `role:a|b` accepts any of the listed roles. Anything else that is not
    /// a known policy name is a configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "public" => Ok(AuthPolicy::Public),
            "authenticated" => Ok(AuthPolicy::Authenticated),
            "admin_only" => Ok(AuthPolicy::AdminOnly),
            "deny" => Ok(AuthPolicy::Deny),
            s if s.starts_with("role:") => {
                let roles: Vec<String> = s["role:".len()..]
                    .split('|')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect();
                if roles.is_empty() {
                    return Err(LinkHeaderError::config(format!(
                        "Policy '{}' names no role",
                        s
                    )));
                }
                Ok(AuthPolicy::HasRole(roles))
            }
            other => Err(LinkHeaderError::config(format!(
                "Unknown access policy '{}'",
                other
            ))),
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from the request head
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext>;
}

/// Default no-auth provider: every request is anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _parts: &Parts) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// Trusts identity headers set by an authenticating gateway
///
/// Reads [`USER_ID_HEADER`] and [`USER_ROLES_HEADER`]. A request without a
/// user id is anonymous; the role `admin` maps to [`AuthContext::Admin`].
pub struct HeaderAuthProvider;

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext> {
        let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };

        let user_id = raw_id
            .to_str()
            .map_err(|e| anyhow!("Invalid {} header: {}", USER_ID_HEADER, e))?;
        let user_id = Uuid::parse_str(user_id.trim())
            .map_err(|e| anyhow!("Invalid {} header: {}", USER_ID_HEADER, e))?;

        let roles: Vec<String> = parts
            .headers
            .get(USER_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if roles.iter().any(|r| r == "admin") {
            return Ok(AuthContext::Admin { admin_id: user_id });
        }

        Ok(AuthContext::User { user_id, roles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/node/1");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder
            .body(())
            .expect("failed to build request")
            .into_parts()
            .0
    }

    fn user(roles: &[&str]) -> AuthContext {
        AuthContext::User {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_policy_check() {
        let editor = user(&["editor"]);

        assert!(AuthPolicy::Authenticated.check(&editor));
        assert!(AuthPolicy::HasRole(vec!["editor".into()]).check(&editor));
        assert!(!AuthPolicy::AdminOnly.check(&editor));

        let anon = AuthContext::Anonymous;
        assert!(AuthPolicy::Public.check(&anon));
        assert!(!AuthPolicy::Authenticated.check(&anon));
        assert!(!AuthPolicy::HasRole(vec!["editor".into()]).check(&anon));
    }

    #[test]
    fn test_admin_satisfies_role_policies() {
        let admin = AuthContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        assert!(AuthPolicy::HasRole(vec!["editor".into()]).check(&admin));
        assert!(!AuthPolicy::Deny.check(&admin));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("public".parse::<AuthPolicy>().unwrap(), AuthPolicy::Public);
        assert_eq!("deny".parse::<AuthPolicy>().unwrap(), AuthPolicy::Deny);
        assert_eq!(
            " admin_only ".parse::<AuthPolicy>().unwrap(),
            AuthPolicy::AdminOnly
        );
        assert_eq!(
            "role:editor|reviewer".parse::<AuthPolicy>().unwrap(),
            AuthPolicy::HasRole(vec!["editor".to_string(), "reviewer".to_string()])
        );
    }

    #[test]
    fn test_parse_policy_rejects_unknown_names() {
        for policy in ["pubilc", "owner", "service_only", "role:", ""] {
            let err = policy.parse::<AuthPolicy>().unwrap_err();
            assert!(
                matches!(err, LinkHeaderError::Config(_)),
                "{policy} must be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_no_auth_provider_is_anonymous() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "not-even-checked")]);
        let ctx = NoAuthProvider
            .extract_context(&parts)
            .await
            .expect("extract_context should succeed");
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_header_auth_provider_user() {
        let id = Uuid::new_v4();
        let parts = parts_with_headers(&[
            (USER_ID_HEADER, &id.to_string()),
            (USER_ROLES_HEADER, "editor, reviewer"),
        ]);
        let ctx = HeaderAuthProvider
            .extract_context(&parts)
            .await
            .expect("extract_context should succeed");
        assert_eq!(
            ctx,
            AuthContext::User {
                user_id: id,
                roles: vec!["editor".to_string(), "reviewer".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_header_auth_provider_admin_and_anonymous() {
        let id = Uuid::new_v4();
        let parts = parts_with_headers(&[
            (USER_ID_HEADER, &id.to_string()),
            (USER_ROLES_HEADER, "admin"),
        ]);
        let ctx = HeaderAuthProvider.extract_context(&parts).await.unwrap();
        assert!(ctx.is_admin());

        let parts = parts_with_headers(&[]);
        let ctx = HeaderAuthProvider.extract_context(&parts).await.unwrap();
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_header_auth_provider_rejects_bad_id() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "five")]);
        assert!(HeaderAuthProvider.extract_context(&parts).await.is_err());
    }
}
