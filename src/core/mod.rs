//! Core module containing fundamental traits and types for the crate

pub mod auth;
pub mod entity;
pub mod error;
pub mod field;
pub mod rest;
pub mod service;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider, NoAuthProvider};
pub use entity::{ContentEntity, EntityLoader, EntityReference, ObjectType};
pub use error::LinkHeaderError;
pub use field::{ENTITY_REFERENCE, FieldDefinition, FieldDefinitionProvider};
pub use rest::{
    FORMAT_QUERY_PARAMETER, RestConfigStore, RestMethodConfig, RestResourceConfig,
    SerializationFormat, rest_route_name,
};
pub use service::{AccessChecker, UrlGenerator};
