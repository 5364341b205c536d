//! Server integration: route registry, collaborator adapters and middleware
//!
//! This module provides:
//! - A `RouteRegistry` describing the application's named routes
//! - Configuration-driven URL generation and access checks
//! - The axum middleware and a `LinkHeaderBuilder` to assemble it

pub mod access;
pub mod builder;
pub mod middleware;
pub mod registry;
pub mod url;

pub use access::PolicyAccessChecker;
pub use builder::LinkHeaderBuilder;
pub use middleware::{LinkHeaderState, link_header_middleware};
pub use registry::{RouteDefinition, RouteMatch, RouteRegistry, canonical_route_name};
pub use url::RouteUrlGenerator;
