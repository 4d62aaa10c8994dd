//! Test doubles shared by the integration suites.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use api_protocol::domain::ports::{FailureContext, ObservabilitySink};
use api_protocol::domain::{Failure, Severity, Stage, TraceId};

/// Clock the test controls; it only moves when told to.
pub(crate) struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub(crate) fn advance_seconds(&self, seconds: i64) {
        let mut guard = self.0.lock().expect("clock mutex");
        *guard += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// One captured failure report.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub(crate) trace_id: TraceId,
    pub(crate) endpoint: &'static str,
    pub(crate) stage: Stage,
    pub(crate) severity: Severity,
    pub(crate) detail: String,
}

/// Sink keeping every report for later assertions.
#[derive(Default)]
pub(crate) struct RecordingSink {
    reports: Mutex<Vec<Recorded>>,
}

impl RecordingSink {
    pub(crate) fn reports(&self) -> Vec<Recorded> {
        self.reports.lock().expect("sink mutex").clone()
    }
}

impl ObservabilitySink for RecordingSink {
    fn report(&self, failure: &Failure, context: &FailureContext) {
        let detail = match failure {
            Failure::Internal(fault) => fault.diagnostic(),
            other => other.to_string(),
        };
        self.reports.lock().expect("sink mutex").push(Recorded {
            trace_id: context.trace_id,
            endpoint: context.endpoint,
            stage: context.stage,
            severity: context.severity,
            detail,
        });
    }
}
