//! Tagged failure union returned by pipeline stages and handlers.
//!
//! Failures stay in this form until the pipeline boundary, where the
//! [`ErrorNormalizer`](crate::domain::ErrorNormalizer) collapses them into an
//! [`ErrorRecord`](crate::domain::ErrorRecord).

use std::any::Any;
use std::fmt;

use color_eyre::eyre::{Report, eyre};
use thiserror::Error;

use super::error::{DomainCode, ErrorCode, FieldError};

/// Client-caused shape failure produced by the validation gate.
///
/// ## Invariants
/// - Holds at least one [`FieldError`], in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request failed validation on {} field(s)", .errors.len())]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    /// Wrap collected field errors; `None` when the list is empty.
    #[must_use]
    pub fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Failure on a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Field errors in schema order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        self.errors.as_slice()
    }

    /// Consume the failure, returning its field errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Business-rule failure raised deliberately by a handler.
///
/// # Examples
/// ```
/// use api_protocol::domain::{ErrorCode, OperationalFailure};
///
/// let failure = OperationalFailure::not_found("contact does not exist");
/// assert_eq!(failure.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct OperationalFailure {
    code: ErrorCode,
    message: String,
}

impl OperationalFailure {
    /// Raise a failure with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Raise a registered domain code.
    pub fn domain(code: DomainCode, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Domain(code), message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Code carried by the failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message supplied by the handler.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Unanticipated failure; always normalized to a 500.
///
/// Wraps an [`eyre::Report`](color_eyre::eyre::Report) so handlers keep their
/// context chain for diagnostics.
pub struct InternalFault {
    report: Report,
}

impl InternalFault {
    /// Wrap a report.
    #[must_use]
    pub const fn new(report: Report) -> Self {
        Self { report }
    }

    /// Turn a caught panic payload into a fault.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self::new(eyre!("handler panicked: {message}"))
    }

    /// One-line description including the context chain.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{:#}", self.report)
    }

    /// Full diagnostic rendering (chain, plus backtrace sections when
    /// `color_eyre` is installed).
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!("{:?}", self.report)
    }

    /// Borrow the wrapped report.
    #[must_use]
    pub const fn report(&self) -> &Report {
        &self.report
    }
}

impl fmt::Debug for InternalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.report, f)
    }
}

impl fmt::Display for InternalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.report)
    }
}

/// Reporting classification, resolved from the record a failure normalizes
/// to rather than from its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Anticipated client or business failure; informational.
    Expected,
    /// Unanticipated fault; always reported as an error.
    Fault,
}

/// Any failure a stage can produce.
#[derive(Debug, Error)]
pub enum Failure {
    /// Inbound shape failure.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    /// Deliberate business-rule failure.
    #[error(transparent)]
    Operational(#[from] OperationalFailure),
    /// Anything else.
    #[error("internal fault: {0}")]
    Internal(InternalFault),
}

impl Failure {
    /// Wrap an arbitrary error as an internal fault.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(InternalFault::new(Report::new(error)))
    }

    /// Explicit `(status-bearing code, message)` pair, when the failure
    /// carries one.
    #[must_use]
    pub fn explicit_code(&self) -> Option<(ErrorCode, &str)> {
        match self {
            Self::Operational(op) => Some((op.code(), op.message())),
            Self::Validation(_) | Self::Internal(_) => None,
        }
    }

    /// Whether this came from the validation gate.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is an unrecognized fault.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Report> for Failure {
    fn from(report: Report) -> Self {
        Self::Internal(InternalFault::new(report))
    }
}

impl From<InternalFault> for Failure {
    fn from(fault: InternalFault) -> Self {
        Self::Internal(fault)
    }
}
