//! Transport-neutral view of an inbound request.
//!
//! Inbound adapters translate their framework request into a [`RawRequest`]
//! before handing it to the pipeline, so the domain never sees actix types.

use serde_json::{Map, Value};

/// Body as received, before any schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// No body, or only whitespace.
    Empty,
    /// Syntactically valid JSON.
    Json(Value),
    /// Bytes that failed to parse; carries the parser message for logs.
    Malformed(String),
}

impl RawBody {
    /// Classify raw body bytes.
    ///
    /// # Examples
    /// ```
    /// use api_protocol::domain::RawBody;
    ///
    /// assert_eq!(RawBody::from_bytes(b"  "), RawBody::Empty);
    /// assert!(matches!(RawBody::from_bytes(b"{"), RawBody::Malformed(_)));
    /// ```
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(err) => Self::Malformed(err.to_string()),
        }
    }
}

impl From<Value> for RawBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Path parameters, query pairs and body of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    params: Map<String, Value>,
    query: Vec<(String, String)>,
    body: RawBody,
}

impl Default for RawRequest {
    fn default() -> Self {
        Self {
            params: Map::new(),
            query: Vec::new(),
            body: RawBody::Empty,
        }
    }
}

impl RawRequest {
    /// Request with no parameters and no body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(name.into(), Value::String(value.into()));
        self
    }

    /// Add one query pair. Later duplicates win.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RawBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Path parameters as JSON strings.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Last value supplied for a query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Body as received.
    #[must_use]
    pub const fn body(&self) -> &RawBody {
        &self.body
    }
}
