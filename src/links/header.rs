//! Link header values (RFC 8288)

use crate::core::error::LinkHeaderError;
use axum::http::HeaderValue;
use std::fmt;

/// Relation type of an emitted link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRelation {
    /// Entity referenced by one of the subject's fields
    Related,
    /// Another serialization of the subject
    Alternate,
}

impl LinkRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkRelation::Related => "related",
            LinkRelation::Alternate => "alternate",
        }
    }
}

/// One `Link` header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHeaderValue {
    /// Absolute target URL
    pub url: String,

    /// Relation type
    pub rel: LinkRelation,

    /// `title` parameter (reference links)
    pub title: Option<String>,

    /// `type` parameter (alternate links)
    pub media_type: Option<String>,
}

impl LinkHeaderValue {
    /// `<url>; rel="related"; title="<label>"`
    pub fn related(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rel: LinkRelation::Related,
            title: Some(title.into()),
            media_type: None,
        }
    }

    /// `<url>; rel="alternate"; type="<mime>"`
    pub fn alternate(url: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rel: LinkRelation::Alternate,
            title: None,
            media_type: Some(media_type.into()),
        }
    }

    /// Encode as an HTTP header value
    ///
    /// Non-ASCII titles are sent as raw UTF-8 (`obs-text`); control
    /// characters are rejected.
    pub fn to_header_value(&self) -> Result<HeaderValue, LinkHeaderError> {
        let value = self.to_string();
        HeaderValue::from_bytes(value.as_bytes())
            .map_err(|_| LinkHeaderError::InvalidHeaderValue { value })
    }
}

impl fmt::Display for LinkHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>; rel=\"{}\"", self.url, self.rel.as_str())?;
        if let Some(title) = &self.title {
            write!(f, "; title=\"{}\"", escape_quoted(title))?;
        }
        if let Some(media_type) = &self.media_type {
            write!(f, "; type=\"{}\"", escape_quoted(media_type))?;
        }
        Ok(())
    }
}

fn escape_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
