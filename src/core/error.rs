//! Typed error handling for linkhead
//!
//! Collaborator traits return `anyhow::Result` so adapters can surface any
//! failure. The errors the crate raises itself are typed here so callers
//! can match on them.
//!
//! # Error Categories
//!
//! - [`LinkHeaderError::Config`]: invalid or inconsistent configuration
//! - [`LinkHeaderError::UnknownObjectType`]: object type other than `node` / `media`
//! - [`LinkHeaderError::UnknownRoute`] / [`LinkHeaderError::MissingRouteParameter`]:
//!   URL generation problems
//! - [`LinkHeaderError::InvalidHeaderValue`]: a link value that cannot be sent as a header

use thiserror::Error;

/// The main error type for linkhead
#[derive(Debug, Error)]
pub enum LinkHeaderError {
    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Object type string is not one of the decorated entity types
    #[error("Unknown object type '{0}' (expected 'node' or 'media')")]
    UnknownObjectType(String),

    /// No route registered under this name
    #[error("Route '{0}' is not registered")]
    UnknownRoute(String),

    /// A path placeholder had no value bound
    #[error("Route '{route}' requires parameter '{parameter}'")]
    MissingRouteParameter { route: String, parameter: String },

    /// The serialised link value contains bytes not allowed in a header
    #[error("Invalid Link header value '{value}'")]
    InvalidHeaderValue { value: String },
}

impl LinkHeaderError {
    /// Build a configuration error from any displayable message
    pub fn config(message: impl Into<String>) -> Self {
        LinkHeaderError::Config(message.into())
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LinkHeaderError::Config(_) => "CONFIG_ERROR",
            LinkHeaderError::UnknownObjectType(_) => "UNKNOWN_OBJECT_TYPE",
            LinkHeaderError::UnknownRoute(_) => "UNKNOWN_ROUTE",
            LinkHeaderError::MissingRouteParameter { .. } => "MISSING_ROUTE_PARAMETER",
            LinkHeaderError::InvalidHeaderValue { .. } => "INVALID_HEADER_VALUE",
        }
    }
}
