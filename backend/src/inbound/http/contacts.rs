//! Contacts API handlers.
//!
//! ```text
//! GET /api/v1/contacts?limit=20&cursor=...
//! POST /api/v1/contacts {"name":"Ada Lovelace","email":"ada@example.com"}
//! GET /api/v1/contacts/{id}
//! DELETE /api/v1/contacts/{id}
//! ```
//!
//! Handlers only pick the endpoint; validation, execution and envelope
//! rendering all happen in the shared pipeline.

use actix_web::web;
use actix_web::{HttpResponse, delete, get, post};

use super::dispatch::{PipelineRequest, dispatch};
use super::schemas::{
    ContactItemEnvelopeSchema, ContactListEnvelopeSchema, ErrorEnvelopeSchema, NewContactSchema,
};
use super::state::HttpState;

/// List contacts, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    params(
        ("limit" = Option<u32>, Query, description = "Page size, 1 to the configured maximum"),
        ("cursor" = Option<String>, Query, description = "Opaque token from a previous page")
    ),
    responses(
        (status = 200, description = "A page of contacts", body = ContactListEnvelopeSchema),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["contacts"],
    operation_id = "listContacts"
)]
#[get("/contacts")]
pub async fn list_contacts(
    state: web::Data<HttpState>,
    request: PipelineRequest,
) -> HttpResponse {
    dispatch(&state, &state.contacts.list, request).await
}

/// Create a contact.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = NewContactSchema,
    responses(
        (status = 201, description = "Contact created", body = ContactItemEnvelopeSchema),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 409, description = "Email already registered", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["contacts"],
    operation_id = "createContact"
)]
#[post("/contacts")]
pub async fn create_contact(
    state: web::Data<HttpState>,
    request: PipelineRequest,
) -> HttpResponse {
    dispatch(&state, &state.contacts.create, request).await
}

/// Fetch one contact.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    params(("id" = String, Path, description = "Contact identifier (UUID)")),
    responses(
        (status = 200, description = "The contact", body = ContactItemEnvelopeSchema),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 404, description = "No such contact", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["contacts"],
    operation_id = "getContact"
)]
#[get("/contacts/{id}")]
pub async fn get_contact(
    state: web::Data<HttpState>,
    request: PipelineRequest,
) -> HttpResponse {
    dispatch(&state, &state.contacts.get, request).await
}

/// Delete one contact, returning it.
///
/// Repeating the call yields `404 CONTACT_NOT_FOUND` with the same body
/// shape each time.
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    params(("id" = String, Path, description = "Contact identifier (UUID)")),
    responses(
        (status = 200, description = "The removed contact", body = ContactItemEnvelopeSchema),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 404, description = "No such contact", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["contacts"],
    operation_id = "deleteContact"
)]
#[delete("/contacts/{id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    request: PipelineRequest,
) -> HttpResponse {
    dispatch(&state, &state.contacts.delete, request).await
}

/// Register the contact routes on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_contacts)
        .service(create_contact)
        .service(get_contact)
        .service(delete_contact);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use serde_json::{Value, json};

    use super::*;
    use crate::Trace;
    use crate::config::ProtocolConfig;
    use crate::domain::ports::MockObservabilitySink;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::outbound::InMemoryContactsRepository;

    fn state() -> HttpState {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(|| {
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp")
        });
        let mut sink = MockObservabilitySink::new();
        sink.expect_report().return_const(());
        HttpState::build(
            &ProtocolConfig::default(),
            HttpStatePorts {
                contacts: Arc::new(InMemoryContactsRepository::new()),
                clock: Arc::new(clock),
                sink: Arc::new(sink),
            },
        )
        .expect("state builds")
    }

    #[actix_web::test]
    async fn create_then_fetch_round_trips_through_envelopes() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let created = actix_test::TestRequest::post()
            .uri("/api/v1/contacts")
            .set_json(json!({"name": "Ada Lovelace", "email": "ada@example.com"}))
            .send_request(&app)
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(created).await;
        let id = created["item"]["id"].as_str().expect("id").to_owned();
        assert_eq!(created["item"]["createdAt"], "2026-03-01T12:00:00Z");

        let fetched = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/contacts/{id}"))
            .send_request(&app)
            .await;
        assert_eq!(fetched.status(), StatusCode::OK);
        let fetched: Value = actix_test::read_body_json(fetched).await;
        assert_eq!(fetched["item"], created["item"]);
        assert_ne!(fetched["traceId"], created["traceId"]);
    }

    #[actix_web::test]
    async fn malformed_ids_fail_validation() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let res = actix_test::TestRequest::get()
            .uri("/api/v1/contacts/not-a-uuid")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body["details"],
            json!([{"field": "id", "message": "Invalid UUID format"}])
        );
    }

    #[actix_web::test]
    async fn malformed_json_reaches_the_gate() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let res = actix_test::TestRequest::post()
            .uri("/api/v1/contacts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\":")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "body");
    }
}
