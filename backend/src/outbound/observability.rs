//! Tracing-backed observability sink.
//!
//! The level follows the severity the normalizer resolved: expected failures
//! are logged at `info`, faults at `error`. Internal faults carry the full
//! diagnostic chain, including panic payloads, regardless of production mode.

use tracing::{error, info};

use crate::domain::ports::{FailureContext, ObservabilitySink};
use crate::domain::{ErrorCode, Failure, Severity};

/// Sink writing every failure report to the active `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn code_of(failure: &Failure) -> &'static str {
    match failure {
        Failure::Validation(_) => ErrorCode::ValidationError.as_str(),
        Failure::Operational(op) => op.code().as_str(),
        Failure::Internal(_) => ErrorCode::InternalServerError.as_str(),
    }
}

impl ObservabilitySink for TracingSink {
    fn report(&self, failure: &Failure, context: &FailureContext) {
        let code = code_of(failure);
        match (context.severity, failure) {
            (Severity::Fault, Failure::Internal(fault)) => {
                error!(
                    trace_id = %context.trace_id,
                    endpoint = context.endpoint,
                    stage = %context.stage,
                    code,
                    diagnostic = %fault.diagnostic(),
                    "request failed with an internal fault"
                );
            }
            (Severity::Fault, _) => {
                error!(
                    trace_id = %context.trace_id,
                    endpoint = context.endpoint,
                    stage = %context.stage,
                    code,
                    message = %failure,
                    "request failed with an internal fault"
                );
            }
            (Severity::Expected, Failure::Validation(validation)) => {
                info!(
                    trace_id = %context.trace_id,
                    endpoint = context.endpoint,
                    stage = %context.stage,
                    code,
                    fields = validation.errors().len(),
                    "request rejected by validation"
                );
            }
            (Severity::Expected, _) => {
                info!(
                    trace_id = %context.trace_id,
                    endpoint = context.endpoint,
                    stage = %context.stage,
                    code,
                    message = %failure,
                    "request failed"
                );
            }
        }
    }
}
