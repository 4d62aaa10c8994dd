//! Translation between Actix requests and the domain pipeline.
//!
//! Path parameters come from the router's match info, query pairs keep
//! their order (repeated keys resolve last-wins in the domain), and the body
//! is read as raw bytes so malformed JSON reaches the validation gate
//! instead of failing in an extractor. [`PipelineRequest`] does this as an
//! Actix extractor, so route handlers never name the body type.

use actix_web::dev::Payload;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::web::{Bytes, Query};
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::domain::{
    Endpoint, Envelope, ErrorCode, ErrorRecord, PipelineResponse, RawBody, RawRequest,
    TRACE_ID_HEADER, TraceId,
};
use crate::middleware::trace::assigned_trace_id;

use super::state::HttpState;

fn routed(req: &HttpRequest) -> RawRequest {
    let mut raw = RawRequest::new();
    for (name, value) in req.match_info().iter() {
        raw = raw.with_param(name, value);
    }
    // Decoding into string pairs is lossy rather than fallible: bad escapes
    // are kept verbatim and invalid UTF-8 becomes U+FFFD.
    let pairs = Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map(Query::into_inner)
        .unwrap_or_default();
    for (name, value) in pairs {
        raw = raw.with_query(name, value);
    }
    raw
}

/// Build a transport-neutral request from Actix parts.
#[must_use]
pub fn raw_request(req: &HttpRequest, body: &Bytes) -> RawRequest {
    routed(req).with_body(RawBody::from_bytes(body))
}

/// Request parts the pipeline consumes, extracted ahead of the handler.
///
/// A body the transport cannot read (for example one over the payload
/// limit) is passed on as malformed so it still yields an error envelope.
#[derive(Debug)]
pub struct PipelineRequest {
    raw: RawRequest,
    trace_id: Option<TraceId>,
}

impl PipelineRequest {
    /// Bundle a translated request with the trace id the transport assigned.
    #[must_use]
    pub const fn new(raw: RawRequest, trace_id: Option<TraceId>) -> Self {
        Self { raw, trace_id }
    }

    /// Translated request.
    #[must_use]
    pub const fn raw(&self) -> &RawRequest {
        &self.raw
    }

    /// Trace id assigned by the tracing middleware, if it ran.
    #[must_use]
    pub const fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    /// Split into the request and its assigned trace id.
    #[must_use]
    pub fn into_parts(self) -> (RawRequest, Option<TraceId>) {
        (self.raw, self.trace_id)
    }
}

impl FromRequest for PipelineRequest {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Bytes::from_request(req, payload);
        let request = req.clone();
        Box::pin(async move {
            let raw = match body.await {
                Ok(bytes) => raw_request(&request, &bytes),
                Err(error) => routed(&request).with_body(RawBody::Malformed(error.to_string())),
            };
            Ok(Self::new(raw, assigned_trace_id(&request)))
        })
    }
}

/// Run `endpoint` for this request and render the result.
pub async fn dispatch(
    state: &HttpState,
    endpoint: &Endpoint,
    request: PipelineRequest,
) -> HttpResponse {
    let (raw, trace_id) = request.into_parts();
    let response = state.pipeline.process(endpoint, raw, trace_id).await;
    render(response)
}

/// Serialise a pipeline response with its status and `trace-id` header.
#[must_use]
pub fn render(response: PipelineResponse) -> HttpResponse {
    let (status, envelope) = response.into_parts();
    respond(status, &envelope)
}

fn respond(status: actix_web::http::StatusCode, envelope: &Envelope) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    if let Ok(value) = HeaderValue::from_str(&envelope.trace_id().to_string()) {
        builder.insert_header((HeaderName::from_static(TRACE_ID_HEADER), value));
    }
    builder.json(envelope)
}

/// Fallback for requests no route matched.
pub async fn route_not_found(req: HttpRequest) -> HttpResponse {
    let trace_id = assigned_trace_id(&req).unwrap_or_else(TraceId::generate);
    let record = ErrorRecord::new(
        actix_web::http::StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        format!("No route for {} {}", req.method(), req.path()),
    );
    respond(record.status(), &Envelope::error(trace_id, &record))
}
