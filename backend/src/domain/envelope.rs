//! Canonical wire envelopes.
//!
//! Three shapes exist and are never mixed:
//!
//! ```text
//! { "traceId", "item" }
//! { "traceId", "count", "nextCursor"?, "items" }
//! { "traceId", "code", "message", "details"? }
//! ```
//!
//! Optional members are omitted rather than serialised as `null`. Every
//! constructor requires a [`TraceId`], so an envelope cannot exist without
//! one.

use pagination::{Cursor, Page};
use serde::Serialize;
use serde_json::Value;

use super::error::{ErrorCode, ErrorRecord, FieldError};
use super::trace_id::TraceId;

/// Single-resource success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEnvelope {
    trace_id: TraceId,
    item: Value,
}

/// Paginated success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope {
    trace_id: TraceId,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<Cursor>,
    items: Vec<Value>,
}

impl ListEnvelope {
    /// Number of items in this page.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Cursor for the next page; absent on the final page.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    /// Items in this page.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        self.items.as_slice()
    }
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    trace_id: TraceId,
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl ErrorEnvelope {
    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Field details for validation failures.
    #[must_use]
    pub fn details(&self) -> Option<&[FieldError]> {
        self.details.as_deref()
    }
}

/// Any response body the protocol emits.
///
/// # Examples
/// ```
/// use api_protocol::domain::{Envelope, TraceId};
/// use serde_json::json;
///
/// let trace_id = TraceId::generate();
/// let envelope = Envelope::item(trace_id, json!({"id": 1}));
/// let body = serde_json::to_value(&envelope).expect("serialise");
/// assert_eq!(body, json!({"traceId": trace_id.to_string(), "item": {"id": 1}}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `{traceId, item}`.
    Item(ItemEnvelope),
    /// `{traceId, count, nextCursor?, items}`.
    List(ListEnvelope),
    /// `{traceId, code, message, details?}`.
    Error(ErrorEnvelope),
}

impl Envelope {
    /// Wrap a single resource.
    #[must_use]
    pub const fn item(trace_id: TraceId, item: Value) -> Self {
        Self::Item(ItemEnvelope { trace_id, item })
    }

    /// Wrap one page of results. `count` is the page length, never a total.
    #[must_use]
    pub fn list(trace_id: TraceId, page: Page<Value>) -> Self {
        let (items, next_cursor) = page.into_parts();
        Self::List(ListEnvelope {
            trace_id,
            count: items.len(),
            next_cursor,
            items,
        })
    }

    /// Wrap a normalized error record.
    #[must_use]
    pub fn error(trace_id: TraceId, record: &ErrorRecord) -> Self {
        Self::Error(ErrorEnvelope {
            trace_id,
            code: record.code(),
            message: record.message().to_owned(),
            details: record.details().map(<[FieldError]>::to_vec),
        })
    }

    /// Identifier of the request this envelope answers.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        match self {
            Self::Item(envelope) => envelope.trace_id,
            Self::List(envelope) => envelope.trace_id,
            Self::Error(envelope) => envelope.trace_id,
        }
    }

    /// Whether this is a failure body.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
