//! Error taxonomy shared by every endpoint.
//!
//! [`ErrorCode`] is the closed set of machine-readable codes a client can
//! receive. Standard codes are fixed here; services extend the set only by
//! registering a [`DomainCode`] in the
//! [`ErrorCatalogue`](crate::domain::ErrorCatalogue), which also owns the
//! code → status mapping.
//!
//! [`ErrorRecord`] is the normalized `(status, code, message, details)` tuple
//! produced by the [`ErrorNormalizer`](crate::domain::ErrorNormalizer).

use std::fmt;

use actix_web::http::StatusCode;
use serde::{Serialize, Serializer};

/// Service-specific error code paired with its HTTP status.
///
/// Declare these as constants next to the handlers that raise them and
/// register each one in the catalogue at start-up.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use api_protocol::domain::DomainCode;
///
/// const ROUTE_LOCKED: DomainCode = DomainCode::new("ROUTE_LOCKED", StatusCode::CONFLICT);
/// assert_eq!(ROUTE_LOCKED.name(), "ROUTE_LOCKED");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainCode {
    name: &'static str,
    status: StatusCode,
}

impl DomainCode {
    /// Declare a domain code. Names use `SCREAMING_SNAKE_CASE`.
    #[must_use]
    pub const fn new(name: &'static str, status: StatusCode) -> Self {
        Self { name, status }
    }

    /// Wire name of the code.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Status the code was declared with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request failed shape validation.
    ValidationError,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with current state.
    Conflict,
    /// A dependency is temporarily unavailable.
    ServiceUnavailable,
    /// An unanticipated failure inside the service.
    InternalServerError,
    /// A code registered by the service.
    Domain(DomainCode),
}

impl ErrorCode {
    /// Standard codes, in catalogue order.
    pub const STANDARD: [Self; 7] = [
        Self::ValidationError,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::Conflict,
        Self::ServiceUnavailable,
        Self::InternalServerError,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::Domain(code) => code.name(),
        }
    }

    /// Message used when a failure arrives without a usable one.
    #[must_use]
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => INVALID_REQUEST_DATA,
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access denied",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Request conflicts with current state",
            Self::ServiceUnavailable => "Service temporarily unavailable",
            Self::InternalServerError => GENERIC_INTERNAL_MESSAGE,
            Self::Domain(_) => "Request could not be completed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Top-level message for every validation failure.
pub const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Message exposed for internal faults in production mode.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// One field-level validation problem.
///
/// `field` uses dot/bracket notation (`address.city`, `tags[2]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    field: String,
    message: String,
}

impl FieldError {
    /// Describe a problem with one field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Path of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Human-readable description of the problem.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Normalized error tuple emitted on every failure path.
///
/// ## Invariants
/// - `message` is never blank; blank input falls back to
///   [`ErrorCode::default_message`].
/// - `details` is either absent or non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    status: StatusCode,
    code: ErrorCode,
    message: String,
    details: Option<Vec<FieldError>>,
}

impl ErrorRecord {
    /// Build a record without field details.
    ///
    /// # Examples
    /// ```
    /// use actix_web::http::StatusCode;
    /// use api_protocol::domain::{ErrorCode, ErrorRecord};
    ///
    /// let record = ErrorRecord::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, "  ");
    /// assert_eq!(record.message(), "Resource not found");
    /// ```
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        let raw = message.into();
        let text = if raw.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            raw
        };
        Self {
            status,
            code,
            message: text,
            details: None,
        }
    }

    /// Attach field details; an empty list leaves `details` absent.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = if details.is_empty() {
            None
        } else {
            Some(details)
        };
        self
    }

    /// HTTP status for the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

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

    /// Field-level problems, present only for validation failures.
    #[must_use]
    pub fn details(&self) -> Option<&[FieldError]> {
        self.details.as_deref()
    }
}
