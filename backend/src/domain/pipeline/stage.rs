//! Pipeline lifecycle states.

use std::fmt;

use actix_web::http::StatusCode;
use tracing::debug;

use crate::domain::{Envelope, TraceId};

use super::PipelineResponse;

/// Stage of a single request.
///
/// ```text
/// Received → Validating → Executing → Formatting → Completed
///     └──────────┴────────────┴───────────┴→ Failing → Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Trace identifier assigned.
    Received,
    /// Validation gate running.
    Validating,
    /// Handler in flight.
    Executing,
    /// Success envelope being built.
    Formatting,
    /// Failure being normalized.
    Failing,
    /// Envelope emitted; terminal.
    Completed,
}

impl Stage {
    /// Whether `next` may follow `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::Validating)
                | (Self::Validating, Self::Executing)
                | (Self::Executing, Self::Formatting)
                | (Self::Formatting | Self::Failing, Self::Completed)
                | (
                    Self::Received | Self::Validating | Self::Executing | Self::Formatting,
                    Self::Failing
                )
        )
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Formatting => "formatting",
            Self::Failing => "failing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage tracker for one request.
///
/// [`Lifecycle::complete`] consumes the tracker, so a request can emit at
/// most one envelope.
#[derive(Debug)]
pub(super) struct Lifecycle {
    trace_id: TraceId,
    stage: Stage,
}

impl Lifecycle {
    pub(super) const fn received(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            stage: Stage::Received,
        }
    }

    pub(super) const fn stage(&self) -> Stage {
        self.stage
    }

    pub(super) fn enter(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.stage
        );
        debug!(from = %self.stage, to = %next, "pipeline stage transition");
        self.stage = next;
    }

    pub(super) fn complete(mut self, status: StatusCode, envelope: Envelope) -> PipelineResponse {
        debug_assert_eq!(envelope.trace_id(), self.trace_id);
        self.enter(Stage::Completed);
        PipelineResponse { status, envelope }
    }
}
