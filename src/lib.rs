//! # linkhead
//!
//! Axum middleware that makes content entity pages discoverable through HTTP
//! `Link` headers.
//!
//! ## Features
//!
//! - **Related entities**: one `rel="related"` link per entity referenced by a
//!   bundle-configured entity reference field, titled with the field label
//! - **Alternate representations**: one `rel="alternate"` link per REST GET
//!   format of the entity (JSON, JSON-LD, HAL+JSON, XML)
//! - **Access aware**: entities and routes the acting user cannot reach are
//!   never advertised
//! - **Fail safe**: ineligible responses (cached, non-200, non-GET, not about a
//!   node or media entity) are left alone, and collaborator failures never
//!   break the response
//! - **Configuration-Based**: routes, fields, REST resources and policies from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkhead::prelude::*;
//!
//! let config = LinkHeaderConfig::from_yaml_file("links.yaml")?;
//!
//! let store = InMemoryEntityStore::new();
//! store.insert(
//!     StoredEntity::new("node", "article", "1")
//!         .with_reference("field_author", EntityReference::new("user", "5")),
//! )?;
//!
//! let links = LinkHeaderBuilder::new()
//!     .with_config(config)
//!     .with_entity_loader(store)
//!     .build()?;
//!
//! let app = links.apply(Router::new().route("/node/{node}", get(show_node)));
//!
//! // GET /node/1
//! // Link: <https://example.org/user/5>; rel="related"; title="Author"
//! ```

pub mod config;
pub mod core;
pub mod links;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        AccessChecker, ContentEntity, EntityLoader, FieldDefinitionProvider, RestConfigStore,
        UrlGenerator,
        auth::{AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider, NoAuthProvider},
        entity::{EntityReference, ObjectType},
        error::LinkHeaderError,
        field::FieldDefinition,
        rest::{RestResourceConfig, SerializationFormat},
    };

    // === Link Generation ===
    pub use crate::links::{
        AlternateLinkGenerator, Collaborators, LinkHeaderDecorator, LinkHeaderValue, LinkRelation,
        ReferenceLinkGenerator, RequestContext, ResponseHead, SubjectResolver,
    };

    // === Storage ===
    pub use crate::storage::{
        InMemoryEntityStore, InMemoryFieldDefinitions, InMemoryRestConfigStore, StoredEntity,
    };

    // === Config ===
    pub use crate::config::{AccessConfig, BundleFieldsConfig, LinkHeaderConfig};

    // === Server ===
    pub use crate::server::{
        LinkHeaderBuilder, LinkHeaderState, PolicyAccessChecker, RouteDefinition, RouteMatch,
        RouteRegistry, RouteUrlGenerator,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;

    // === Axum ===
    pub use axum::{
        Router,
        extract::Path,
        routing::{get, post},
    };
}
