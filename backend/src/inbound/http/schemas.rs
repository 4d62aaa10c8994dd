//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Standard codes are listed; services may register additional
/// `UPPER_SNAKE_CASE` domain codes such as `CONTACT_NOT_FOUND`.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request failed shape validation.
    #[schema(rename = "VALIDATION_ERROR")]
    ValidationError,
    /// Authentication failed or is missing.
    #[schema(rename = "UNAUTHORIZED")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "FORBIDDEN")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "NOT_FOUND")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "CONFLICT")]
    Conflict,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "INTERNAL_SERVER_ERROR")]
    InternalServerError,
    /// No contact has the requested identifier.
    #[schema(rename = "CONTACT_NOT_FOUND")]
    ContactNotFound,
    /// The email address is already registered.
    #[schema(rename = "EMAIL_TAKEN")]
    EmailTaken,
}

/// OpenAPI schema for [`crate::domain::FieldError`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FieldError)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorSchema {
    /// Path of the offending field, e.g. `email` or `tags[2]`.
    #[schema(example = "email")]
    field: String,
    /// What is wrong with it.
    #[schema(example = "Invalid email format")]
    message: String,
}

/// OpenAPI schema for [`crate::domain::ErrorEnvelope`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorEnvelope, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "0192f1c4-6a1e-7cc2-9a4f-3b8d2f1e0a55")]
    trace_id: uuid::Uuid,
    /// Stable machine-readable error code.
    #[schema(example = "VALIDATION_ERROR")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "Invalid request data")]
    message: String,
    /// Per-field validation errors, present only for `VALIDATION_ERROR`.
    #[schema(nullable = false)]
    details: Option<Vec<FieldErrorSchema>>,
}

/// OpenAPI schema for [`crate::domain::Contact`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Contact, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ContactSchema {
    /// Stable contact identifier.
    id: uuid::Uuid,
    /// Display name.
    #[schema(example = "Ada Lovelace", min_length = 1, max_length = 120)]
    name: String,
    /// Unique email address.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Free-form labels.
    #[schema(max_items = 10)]
    tags: Vec<String>,
    /// Creation time; also the listing order.
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::contacts::NewContact`].
#[derive(ToSchema)]
#[schema(as = crate::domain::contacts::NewContact)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NewContactSchema {
    /// Display name.
    #[schema(example = "Ada Lovelace", min_length = 1, max_length = 120)]
    name: String,
    /// Email address; must not already be registered.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Up to ten labels of 1 to 32 characters.
    tags: Option<Vec<String>>,
}

/// Item envelope carrying one contact.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ContactItemEnvelopeSchema {
    /// Correlation identifier.
    trace_id: uuid::Uuid,
    /// The contact.
    item: ContactSchema,
}

/// List envelope carrying a page of contacts.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ContactListEnvelopeSchema {
    /// Correlation identifier.
    trace_id: uuid::Uuid,
    /// Number of items in this page.
    count: usize,
    /// Opaque token for the next page; absent on the last page.
    #[schema(nullable = false)]
    next_cursor: Option<String>,
    /// The page.
    items: Vec<ContactSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_wire_codes() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in crate::domain::ErrorCode::STANDARD {
            assert!(schema_json.contains(code.as_str()), "missing {code}");
        }
        for code in crate::domain::CONTACT_CODES {
            assert!(schema_json.contains(code.name()), "missing {}", code.name());
        }
    }

    #[test]
    fn error_envelope_schema_uses_wire_names() {
        let schema_json = schema_to_json::<ErrorEnvelopeSchema>();
        assert_eq!(ErrorEnvelopeSchema::name(), "crate.domain.ErrorEnvelope");
        assert!(schema_json.contains("traceId"), "schema should use traceId");
        assert!(schema_json.contains("details"), "schema should contain details");
    }

    #[test]
    fn list_envelope_schema_uses_wire_names() {
        let schema_json = schema_to_json::<ContactListEnvelopeSchema>();
        assert!(schema_json.contains("nextCursor"));
        assert!(schema_json.contains("count"));
    }
}
