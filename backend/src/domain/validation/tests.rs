//! Gate-level behaviour: policies, request parts and error ordering.

use std::num::NonZeroUsize;

use pagination::{CursorCodec, CursorSecret};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::error::FieldError;
use crate::domain::paging::{LIMIT_PARAM, PaginationMode, PaginationPolicy};
use crate::domain::request::{RawBody, RawRequest};

fn policy() -> PaginationPolicy {
    let max = NonZeroUsize::new(50).expect("non-zero");
    PaginationPolicy::new(NonZeroUsize::MIN, max).expect("valid policy")
}

#[fixture]
fn lenient() -> ValidationGate {
    ValidationGate::new(false, policy())
}

#[fixture]
fn strict() -> ValidationGate {
    ValidationGate::new(true, policy())
}

#[fixture]
fn contact_schema() -> Schema {
    Schema::new()
        .required("name", StringRule::new().min_len(1).max_len(80))
        .required("email", StringRule::new().email())
        .optional("tags", ArrayRule::of(StringRule::new().max_len(16)).max_items(5))
}

fn errors_of(result: Result<impl std::fmt::Debug, crate::domain::ValidationFailure>) -> Vec<FieldError> {
    result.expect_err("validation fails").into_errors()
}

#[rstest]
fn invalid_email_is_reported_on_its_field(lenient: ValidationGate) {
    let schema = Schema::new().required("email", StringRule::new().email());
    let body = RawBody::Json(json!({"email": "not-an-email"}));
    assert_eq!(
        errors_of(lenient.validate(&schema, &body)),
        vec![FieldError::new("email", "Invalid email format")]
    );
}

#[rstest]
fn errors_follow_schema_order(lenient: ValidationGate, contact_schema: Schema) {
    let body = RawBody::Json(json!({
        "tags": ["ok", "far-too-long-for-a-tag"],
        "email": "nope",
    }));
    assert_eq!(
        errors_of(lenient.validate(&contact_schema, &body)),
        vec![
            FieldError::new("name", "Required"),
            FieldError::new("email", "Invalid email format"),
            FieldError::new("tags[1]", "Must be at most 16 characters"),
        ]
    );
}

#[rstest]
fn unknown_fields_are_dropped_when_lenient(lenient: ValidationGate, contact_schema: Schema) {
    let body = RawBody::Json(json!({
        "name": "Ada",
        "email": "ada@example.com",
        "isAdmin": true,
    }));
    let cleaned = lenient
        .validate(&contact_schema, &body)
        .expect("valid body");
    assert_eq!(
        Value::Object(cleaned),
        json!({"name": "Ada", "email": "ada@example.com"})
    );
}

#[rstest]
fn unknown_fields_are_rejected_when_strict(strict: ValidationGate, contact_schema: Schema) {
    let body = RawBody::Json(json!({
        "name": "Ada",
        "email": "ada@example.com",
        "isAdmin": true,
    }));
    assert_eq!(
        errors_of(strict.validate(&contact_schema, &body)),
        vec![FieldError::new("isAdmin", "Unknown field")]
    );
}

#[rstest]
fn strict_schemas_reject_unknown_fields_under_a_lenient_gate(lenient: ValidationGate) {
    let schema = Schema::new()
        .required("name", StringRule::new())
        .strict();
    let body = RawBody::Json(json!({"name": "Ada", "role": "admin"}));
    assert_eq!(
        errors_of(lenient.validate(&schema, &body)),
        vec![FieldError::new("role", "Unknown field")]
    );
}

#[rstest]
#[case(RawBody::Malformed("EOF".to_owned()), "Malformed JSON body")]
#[case(RawBody::Json(json!(["not", "an", "object"])), "Expected an object")]
#[case(RawBody::Json(json!("text")), "Expected an object")]
fn bodies_that_are_not_objects_fail_on_body(
    lenient: ValidationGate,
    contact_schema: Schema,
    #[case] body: RawBody,
    #[case] message: &str,
) {
    assert_eq!(
        errors_of(lenient.validate(&contact_schema, &body)),
        vec![FieldError::new("body", message)]
    );
}

#[rstest]
fn empty_bodies_report_each_required_field(lenient: ValidationGate, contact_schema: Schema) {
    assert_eq!(
        errors_of(lenient.validate(&contact_schema, &RawBody::Empty)),
        vec![
            FieldError::new("name", "Required"),
            FieldError::new("email", "Required"),
        ]
    );
}

#[rstest]
fn request_errors_are_collected_across_parts(lenient: ValidationGate, contact_schema: Schema) {
    let contract = RequestContract::new()
        .params(Schema::new().required("id", StringRule::new().uuid()))
        .paginated(PaginationMode::cursor::<String, u32>(CursorCodec::new(
            "created_at",
            CursorSecret::new(&[1_u8; 32]).expect("secret is long enough"),
        )))
        .body(contact_schema);
    let request = RawRequest::new()
        .with_param("id", "42")
        .with_query(LIMIT_PARAM, "0")
        .with_body(json!({"name": "Ada"}));
    assert_eq!(
        errors_of(lenient.validate_request(&contract, &request)),
        vec![
            FieldError::new("id", "Invalid UUID format"),
            FieldError::new("limit", "Must be a positive integer"),
            FieldError::new("email", "Required"),
        ]
    );
}

#[rstest]
fn validated_input_exposes_typed_accessors(lenient: ValidationGate) {
    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Rename {
        name: String,
    }

    let id = "0190b1d2-7c3e-7a51-9f00-6a1b2c3d4e5f";
    let contract = RequestContract::new()
        .params(Schema::new().required("id", StringRule::new().uuid()))
        .body(Schema::new().required("name", StringRule::new()));
    let request = RawRequest::new()
        .with_param("id", id)
        .with_body(json!({"name": "Grace", "ignored": 1}));
    let input = lenient
        .validate_request(&contract, &request)
        .expect("valid request");

    let parsed: uuid::Uuid = input.param_as("id").expect("uuid parses");
    assert_eq!(parsed.to_string(), id);
    assert_eq!(
        input.body_as::<Rename>().expect("body fits"),
        Rename {
            name: "Grace".to_owned()
        }
    );
    assert!(input.pagination().is_none());
}

#[rstest]
fn contracts_without_a_body_schema_ignore_the_body(lenient: ValidationGate) {
    let request = RawRequest::new().with_body(RawBody::Malformed("junk".to_owned()));
    let input = lenient
        .validate_request(&RequestContract::new(), &request)
        .expect("nothing to validate");
    assert!(input.body().is_empty());
}
