//! Collapses stage failures into normalized error records.
//!
//! Priority order:
//! 1. operational failures with a registered code pass through;
//! 2. validation failures become `VALIDATION_ERROR` with field details;
//! 3. everything else becomes `INTERNAL_SERVER_ERROR`, redacted in
//!    production mode.
//!
//! Every failure is handed to the [`ObservabilitySink`] with full detail,
//! even when the wire message is generic. Severity follows the outgoing
//! record: anything that reaches the client as `INTERNAL_SERVER_ERROR` is a
//! [`Severity::Fault`], including operational failures that raised that code
//! or an unregistered one.

use std::sync::Arc;

use actix_web::http::StatusCode;

use super::catalogue::ErrorCatalogue;
use super::error::{ErrorCode, ErrorRecord, GENERIC_INTERNAL_MESSAGE, INVALID_REQUEST_DATA};
use super::failure::{Failure, OperationalFailure, Severity};
use super::ports::{FailureSite, ObservabilitySink};

/// Maps [`Failure`]s to [`ErrorRecord`]s.
#[derive(Clone)]
pub struct ErrorNormalizer {
    catalogue: Arc<ErrorCatalogue>,
    production_mode: bool,
    sink: Arc<dyn ObservabilitySink>,
}

impl ErrorNormalizer {
    /// Build a normalizer sharing the catalogue and sink.
    #[must_use]
    pub fn new(
        catalogue: Arc<ErrorCatalogue>,
        production_mode: bool,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        Self {
            catalogue,
            production_mode,
            sink,
        }
    }

    /// Whether internal fault descriptions are redacted.
    #[must_use]
    pub const fn production_mode(&self) -> bool {
        self.production_mode
    }

    /// Report `failure` and return the record clients will see.
    pub fn normalize(&self, failure: &Failure, site: FailureSite) -> ErrorRecord {
        let record = match failure {
            Failure::Operational(operational) => self.operational(operational),
            Failure::Validation(validation) => ErrorRecord::new(
                self.catalogue.validation_status(),
                ErrorCode::ValidationError,
                INVALID_REQUEST_DATA,
            )
            .with_details(validation.errors().to_vec()),
            Failure::Internal(fault) => self.internal(fault.description()),
        };
        self.sink
            .report(failure, &site.with_severity(severity_of(&record)));
        record
    }

    fn operational(&self, failure: &OperationalFailure) -> ErrorRecord {
        let code = failure.code();
        if code == ErrorCode::InternalServerError {
            return self.internal(failure.message().to_owned());
        }
        match self.catalogue.status_for(code) {
            Some(status) => ErrorRecord::new(status, code, failure.message()),
            None => self.internal(format!("unregistered error code {code}: {}", failure.message())),
        }
    }

    fn internal(&self, description: String) -> ErrorRecord {
        let message = if self.production_mode {
            GENERIC_INTERNAL_MESSAGE.to_owned()
        } else {
            description
        };
        ErrorRecord::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            message,
        )
    }
}

fn severity_of(record: &ErrorRecord) -> Severity {
    if record.code() == ErrorCode::InternalServerError {
        Severity::Fault
    } else {
        Severity::Expected
    }
}

impl std::fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNormalizer")
            .field("catalogue", &self.catalogue)
            .field("production_mode", &self.production_mode)
            .finish_non_exhaustive()
    }
}
