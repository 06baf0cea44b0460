//! Payload source selection
//!
//! A request carries three independent key-value sources. Exactly one of them
//! is validated: the first non-empty one in the order body, query, path.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Flat key-value payload
pub type Fields = Map<String, Value>;

/// Take the fields of a JSON object; any other value has no fields
pub fn fields_of(value: Value) -> Option<Fields> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Which request source a payload was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    Body,
    Query,
    Path,
}

impl PayloadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadSource::Body => "body",
            PayloadSource::Query => "query",
            PayloadSource::Path => "path",
        }
    }
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three candidate sources of a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadSources {
    pub body: Fields,
    pub query: Fields,
    pub path: Fields,
}

/// The source chosen for validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedPayload<'a> {
    pub source: PayloadSource,
    pub fields: &'a Fields,
}

impl PayloadSources {
    pub fn new(body: Fields, query: Fields, path: Fields) -> Self {
        Self { body, query, path }
    }

    /// Sources with only a body
    pub fn from_body(body: Fields) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// Pick the payload to validate
    ///
    /// First non-empty source wins; sources are never merged. Returns `None`
    /// when all three are empty.
    pub fn select(&self) -> Option<SelectedPayload<'_>> {
        let selected = [
            (PayloadSource::Body, &self.body),
            (PayloadSource::Query, &self.query),
            (PayloadSource::Path, &self.path),
        ]
        .into_iter()
        .find(|(_, fields)| !fields.is_empty())
        .map(|(source, fields)| SelectedPayload { source, fields });

        match &selected {
            Some(payload) => tracing::trace!(
                source = %payload.source,
                keys = payload.fields.len(),
                "selected payload source"
            ),
            None => tracing::trace!("no payload source has keys"),
        }

        selected
    }
}
