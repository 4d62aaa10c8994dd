//! Request pipeline orchestration.
//!
//! One [`Pipeline`] is built at start-up and shared; each call to
//! [`Pipeline::process`] drives an independent request through
//! `Received → Validating → Executing → Formatting → Completed`, diverting to
//! `Failing` from any active stage. Every path yields exactly one envelope.
//!
//! Handler panics are caught and treated as internal faults. Cancellation is
//! exposed through [`Pipeline::process_cancellable`]: when the token fires
//! the in-flight handler future is dropped and no response is produced.

mod stage;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use actix_web::http::StatusCode;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::config::ProtocolConfig;
use crate::domain::ports::{FailureSite, Handler, ObservabilitySink};
use crate::domain::validation::{RequestContract, ValidatedInput, ValidationGate};
use crate::domain::{
    Envelope, ErrorCatalogue, ErrorNormalizer, Failure, InternalFault, RawRequest, Reply, TraceId,
};

pub use stage::Stage;
use stage::Lifecycle;

/// A routable operation: name, accepted shape and handler.
#[derive(Clone)]
pub struct Endpoint {
    name: &'static str,
    contract: RequestContract,
    handler: Arc<dyn Handler>,
}

impl Endpoint {
    /// Declare an endpoint.
    pub fn new(name: &'static str, contract: RequestContract, handler: impl Handler + 'static) -> Self {
        Self {
            name,
            contract,
            handler: Arc::new(handler),
        }
    }

    /// Declare an endpoint around a shared handler.
    #[must_use]
    pub fn from_shared(
        name: &'static str,
        contract: RequestContract,
        handler: Arc<dyn Handler>,
    ) -> Self {
        Self {
            name,
            contract,
            handler,
        }
    }

    /// Name used in logs and failure reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Shape the endpoint accepts.
    #[must_use]
    pub const fn contract(&self) -> &RequestContract {
        &self.contract
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Status and body emitted for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    status: StatusCode,
    envelope: Envelope,
}

impl PipelineResponse {
    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Trace identifier echoed in the body.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.envelope.trace_id()
    }

    /// Split into status and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Envelope) {
        (self.status, self.envelope)
    }
}

/// Validation gate, handler and normalizer wired in sequence.
#[derive(Debug, Clone)]
pub struct Pipeline {
    gate: ValidationGate,
    normalizer: ErrorNormalizer,
}

impl Pipeline {
    /// Build a pipeline from explicit configuration, catalogue and sink.
    #[must_use]
    pub fn new(
        config: &ProtocolConfig,
        catalogue: Arc<ErrorCatalogue>,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        Self {
            gate: config.gate(),
            normalizer: ErrorNormalizer::new(catalogue, config.production_mode(), sink),
        }
    }

    /// Run one request to completion.
    ///
    /// `assigned` is used when the transport already assigned one; otherwise
    /// a fresh identifier is generated on entry.
    pub async fn process(
        &self,
        endpoint: &Endpoint,
        request: RawRequest,
        assigned: Option<TraceId>,
    ) -> PipelineResponse {
        let trace_id = assigned.unwrap_or_else(TraceId::generate);
        let span = info_span!("request", trace_id = %trace_id, endpoint = endpoint.name());
        TraceId::scope(trace_id, self.run(endpoint, request, trace_id))
            .instrument(span)
            .await
    }

    /// Run one request unless `cancel` fires first.
    ///
    /// Returns `None` when cancelled; the handler future is dropped and
    /// nothing is emitted.
    pub async fn process_cancellable(
        &self,
        endpoint: &Endpoint,
        request: RawRequest,
        trace_id: Option<TraceId>,
        cancel: &CancellationToken,
    ) -> Option<PipelineResponse> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(endpoint = endpoint.name(), "request cancelled by transport");
                None
            }
            response = self.process(endpoint, request, trace_id) => Some(response),
        }
    }

    async fn run(
        &self,
        endpoint: &Endpoint,
        request: RawRequest,
        trace_id: TraceId,
    ) -> PipelineResponse {
        let mut lifecycle = Lifecycle::received(trace_id);

        lifecycle.enter(Stage::Validating);
        let outcome = match self.gate.validate_request(endpoint.contract(), &request) {
            Ok(input) => {
                lifecycle.enter(Stage::Executing);
                execute(endpoint, input).await
            }
            Err(failure) => Err(Failure::from(failure)),
        };

        match outcome {
            Ok(reply) => {
                lifecycle.enter(Stage::Formatting);
                let status = reply.status();
                lifecycle.complete(status, reply.into_envelope(trace_id))
            }
            Err(failure) => {
                let site = FailureSite {
                    trace_id,
                    endpoint: endpoint.name(),
                    stage: lifecycle.stage(),
                };
                lifecycle.enter(Stage::Failing);
                let record = self.normalizer.normalize(&failure, site);
                lifecycle.complete(record.status(), Envelope::error(trace_id, &record))
            }
        }
    }
}

async fn execute(endpoint: &Endpoint, input: ValidatedInput) -> Result<Reply, Failure> {
    AssertUnwindSafe(endpoint.handler.handle(input))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(InternalFault::from_panic(payload).into()))
}
