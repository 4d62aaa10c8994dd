//! Domain core of the response/error protocol.
//!
//! Purpose: define the transport-neutral pieces every endpoint shares and
//! the pipeline that sequences them. Nothing here reads ambient globals;
//! configuration, the error catalogue and the observability sink are passed
//! in explicitly.
//!
//! Public surface:
//! - [`TraceId`]: per-request, time-ordered identifier.
//! - [`ErrorCode`], [`DomainCode`], [`ErrorCatalogue`], [`ErrorRecord`]: the
//!   closed error taxonomy and its status mapping.
//! - [`Failure`] and its variants: what stages and handlers return.
//! - [`ErrorNormalizer`]: failure → record, reporting to the sink.
//! - [`Envelope`]: the three wire shapes.
//! - [`validation`]: schemas and the gate.
//! - [`Pipeline`], [`Endpoint`], [`Reply`]: orchestration.
//! - [`contacts`]: the demonstration resource.

pub mod catalogue;
pub mod contacts;
pub mod envelope;
pub mod error;
pub mod failure;
pub mod normalizer;
pub mod paging;
pub mod pipeline;
pub mod ports;
pub mod reply;
pub mod request;
pub mod trace_id;
pub mod validation;

pub use self::catalogue::{CATALOGUE_VERSION, CatalogueError, ErrorCatalogue, ValidationStatus};
pub use self::contacts::{
    CONTACT_CODES, CONTACTS_ORDERING, Contact, ContactEndpoints, ContactsService,
};
pub use self::envelope::{Envelope, ErrorEnvelope, ItemEnvelope, ListEnvelope};
pub use self::error::{
    DomainCode, ErrorCode, ErrorRecord, FieldError, GENERIC_INTERNAL_MESSAGE, INVALID_REQUEST_DATA,
};
pub use self::failure::{Failure, InternalFault, OperationalFailure, Severity, ValidationFailure};
pub use self::normalizer::ErrorNormalizer;
pub use self::paging::{CursorShape, PaginationMode, PaginationPolicy, PaginationRequest};
pub use self::pipeline::{Endpoint, Pipeline, PipelineResponse, Stage};
pub use self::reply::Reply;
pub use self::request::{RawBody, RawRequest};
pub use self::trace_id::TraceId;
pub use self::validation::{RequestContract, ValidatedInput};

/// Header carrying the trace identifier on every response.
pub const TRACE_ID_HEADER: &str = "trace-id";
