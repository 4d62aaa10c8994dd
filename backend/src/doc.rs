//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the contacts endpoints from the inbound layer
//! - **Schemas**: domain type wrappers ([`ErrorEnvelopeSchema`],
//!   [`ErrorCodeSchema`], [`ContactSchema`] and the envelopes) that provide
//!   OpenAPI definitions without coupling domain types to utoipa
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    ContactItemEnvelopeSchema, ContactListEnvelopeSchema, ContactSchema, ErrorCodeSchema,
    ErrorEnvelopeSchema, FieldErrorSchema, NewContactSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "API protocol reference service",
        description = "Every response is an item, list or error envelope carrying a traceId."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::contacts::list_contacts,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::delete_contact,
    ),
    components(schemas(
        ContactSchema,
        NewContactSchema,
        ContactItemEnvelopeSchema,
        ContactListEnvelopeSchema,
        ErrorEnvelopeSchema,
        ErrorCodeSchema,
        FieldErrorSchema
    )),
    tags(
        (name = "contacts", description = "Demonstration resource served through the pipeline")
    )
)]
pub struct ApiDoc;
