//! Port receiving every normalized failure with full detail.

use crate::domain::{Failure, Severity, Stage, TraceId};

/// Where a failure surfaced, before it has been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureSite {
    /// Identifier of the failing request.
    pub trace_id: TraceId,
    /// Endpoint name the request was routed to.
    pub endpoint: &'static str,
    /// Stage the failure was raised in.
    pub stage: Stage,
}

impl FailureSite {
    /// Attach the severity the normalizer resolved.
    #[must_use]
    pub const fn with_severity(self, severity: Severity) -> FailureContext {
        FailureContext {
            trace_id: self.trace_id,
            endpoint: self.endpoint,
            stage: self.stage,
            severity,
        }
    }
}

/// Where and when a failure surfaced, and how it was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureContext {
    /// Identifier of the failing request.
    pub trace_id: TraceId,
    /// Endpoint name the request was routed to.
    pub endpoint: &'static str,
    /// Stage the failure was raised in.
    pub stage: Stage,
    /// `Fault` whenever the client sees `INTERNAL_SERVER_ERROR`.
    pub severity: Severity,
}

/// Destination for failure reports.
///
/// Implementations receive the original [`Failure`], not the redacted wire
/// record, and must not block.
#[cfg_attr(test, mockall::automock)]
pub trait ObservabilitySink: Send + Sync {
    /// Record one failure.
    fn report(&self, failure: &Failure, context: &FailureContext);
}
