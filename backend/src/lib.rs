//! Uniform response envelopes, a closed error taxonomy and cursor pagination
//! for HTTP services.
//!
//! Requests flow through [`domain::Pipeline`]: validation gate, handler,
//! then exactly one envelope. Failures are normalized into catalogue records
//! and reported to an [`domain::ports::ObservabilitySink`] before anything
//! reaches the client.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
