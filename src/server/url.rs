//! Absolute URL generation from the route registry

use crate::core::entity::EntityReference;
use crate::core::error::LinkHeaderError;
use crate::core::service::UrlGenerator;
use crate::server::registry::{RouteRegistry, canonical_route_name};
use anyhow::Result;
use regex::{Captures, Regex};
use std::fmt::Write;
use std::sync::{Arc, OnceLock};
use url::Url;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{(\*?)([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// Builds absolute URLs by filling route path templates
///
/// Entity URLs use the `entity.<type>.canonical` route, whose path parameter
/// is named after the entity type (e.g., `/user/{user}`). Paths are resolved
/// against `base_url`, so a base with a path prefix (`https://example.org/site`)
/// keeps it.
pub struct RouteUrlGenerator {
    base_url: Url,
    registry: Arc<RouteRegistry>,
}

impl RouteUrlGenerator {
    /// Create a generator
    ///
    /// Query and fragment of `base_url` are dropped.
    pub fn new(base_url: &str, registry: Arc<RouteRegistry>) -> Result<Self, LinkHeaderError> {
        let mut base = Url::parse(base_url).map_err(|e| {
            LinkHeaderError::config(format!("Invalid base_url '{}': {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(LinkHeaderError::config(format!(
                "base_url '{}' cannot be used as a base",
                base_url
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            base_url: base,
            registry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn fill_path(
        &self,
        route_name: &str,
        template: &str,
        params: &[(&str, &str)],
    ) -> Result<String, LinkHeaderError> {
        let mut missing = None;
        let path = placeholder_regex().replace_all(template, |caps: &Captures| {
            let wildcard = !caps[1].is_empty();
            let name = &caps[2];
            match params.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => encode_segment(value, wildcard),
                None => {
                    if missing.is_none() {
                        missing = Some(name.to_string());
                    }
                    String::new()
                }
            }
        });

        if let Some(parameter) = missing {
            return Err(LinkHeaderError::MissingRouteParameter {
                route: route_name.to_string(),
                parameter,
            });
        }
        Ok(path.into_owned())
    }
}

impl UrlGenerator for RouteUrlGenerator {
    fn entity_url(&self, entity: &EntityReference) -> Result<String> {
        let route_name = canonical_route_name(&entity.entity_type);
        self.route_url(&route_name, &[(entity.entity_type.as_str(), entity.id.as_str())])
    }

    fn route_url(&self, route_name: &str, params: &[(&str, &str)]) -> Result<String> {
        let route = self
            .registry
            .get(route_name)
            .ok_or_else(|| LinkHeaderError::UnknownRoute(route_name.to_string()))?;
        let path = self.fill_path(route_name, &route.path, params)?;
        // "./" keeps a leading "name:" segment from parsing as a scheme
        let url = self
            .base_url
            .join(&format!("./{}", path.trim_start_matches('/')))?;
        Ok(url.into())
    }
}

/// Percent-encode a path parameter value
///
/// Wildcard values keep their `/` separators.
fn encode_segment(value: &str, wildcard: bool) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'.' | b'_' | b'~')
            || (wildcard && byte == b'/');
        if keep {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    encoded
}
