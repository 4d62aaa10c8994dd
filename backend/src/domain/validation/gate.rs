//! The validation gate: checks request shape before any handler runs.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::schema::Schema;
use crate::domain::error::FieldError;
use crate::domain::failure::ValidationFailure;
use crate::domain::paging::{PaginationMode, PaginationPolicy, PaginationRequest};
use crate::domain::request::{RawBody, RawRequest};

const BODY_FIELD: &str = "body";
const MALFORMED_BODY: &str = "Malformed JSON body";
const EXPECTED_OBJECT: &str = "Expected an object";

/// Shape an endpoint accepts.
///
/// Parts left as `None` are not inspected; a body sent to an endpoint
/// without a body schema is ignored.
#[derive(Debug, Clone, Default)]
pub struct RequestContract {
    params: Option<Schema>,
    body: Option<Schema>,
    pagination: Option<PaginationMode>,
}

impl RequestContract {
    /// Contract accepting anything and inspecting nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate path parameters against `schema`.
    #[must_use]
    pub fn params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Validate the JSON body against `schema`.
    #[must_use]
    pub fn body(mut self, schema: Schema) -> Self {
        self.body = Some(schema);
        self
    }

    /// Accept pagination parameters in `mode`.
    #[must_use]
    pub fn paginated(mut self, mode: PaginationMode) -> Self {
        self.pagination = Some(mode);
        self
    }
}

/// Request data that passed the gate.
///
/// Only declared fields survive; unknown body fields have been dropped or
/// rejected according to the gate policy.
#[derive(Debug, Clone, Default)]
pub struct ValidatedInput {
    params: Map<String, Value>,
    body: Map<String, Value>,
    pagination: Option<PaginationRequest>,
}

impl ValidatedInput {
    /// Validated path parameters.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Parse one path parameter.
    ///
    /// # Errors
    /// Returns a field failure when the parameter is missing or does not
    /// parse, which the gate normally rules out.
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, ValidationFailure> {
        self.params
            .get(name)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ValidationFailure::single(name, "Invalid value"))
    }

    /// Validated body fields.
    #[must_use]
    pub const fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Deserialize the validated body into a typed command.
    ///
    /// # Errors
    /// Returns a body-level failure when the cleaned body does not fit `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ValidationFailure> {
        serde_json::from_value(Value::Object(self.body.clone()))
            .map_err(|err| ValidationFailure::single(BODY_FIELD, err.to_string()))
    }

    /// Validated pagination parameters, when the endpoint is paginated.
    #[must_use]
    pub const fn pagination(&self) -> Option<&PaginationRequest> {
        self.pagination.as_ref()
    }
}

/// Pure request validator configured once per service.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use api_protocol::domain::validation::{Schema, StringRule, ValidationGate};
/// use api_protocol::domain::{FieldError, PaginationPolicy, RawBody};
/// use serde_json::json;
///
/// let policy = PaginationPolicy::new(NonZeroUsize::MIN, NonZeroUsize::MIN).expect("policy");
/// let gate = ValidationGate::new(false, policy);
/// let schema = Schema::new().required("email", StringRule::new().email());
/// let failure = gate
///     .validate(&schema, &RawBody::Json(json!({"email": "not-an-email"})))
///     .expect_err("invalid email");
/// assert_eq!(
///     failure.errors(),
///     [FieldError::new("email", "Invalid email format")]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationGate {
    strict: bool,
    pagination: PaginationPolicy,
}

impl ValidationGate {
    /// Build a gate. `strict` rejects unknown top-level fields instead of
    /// dropping them.
    #[must_use]
    pub const fn new(strict: bool, pagination: PaginationPolicy) -> Self {
        Self { strict, pagination }
    }

    /// Whether unknown top-level fields are rejected.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a body against `schema`.
    ///
    /// An empty body is treated as an empty object, so required fields are
    /// reported individually.
    ///
    /// # Errors
    /// Returns every field problem found, in schema order.
    pub fn validate(
        &self,
        schema: &Schema,
        raw: &RawBody,
    ) -> Result<Map<String, Value>, ValidationFailure> {
        let mut errors = Vec::new();
        let cleaned = self.check_body(schema, raw, &mut errors);
        finish(cleaned, errors)
    }

    /// Validate every part of `request` declared by `contract`.
    ///
    /// Errors are collected across parts in the order params, pagination,
    /// body.
    ///
    /// # Errors
    /// Returns the combined field problems of all parts.
    pub fn validate_request(
        &self,
        contract: &RequestContract,
        request: &RawRequest,
    ) -> Result<ValidatedInput, ValidationFailure> {
        let mut errors = Vec::new();

        let params = match &contract.params {
            Some(schema) => schema.check_object("", request.params(), false, &mut errors),
            None => Some(Map::new()),
        };
        let pagination = match &contract.pagination {
            Some(mode) => self
                .pagination
                .parse(mode, request, &mut errors)
                .map(Some),
            None => Some(None),
        };
        let body = match &contract.body {
            Some(schema) => self.check_body(schema, request.body(), &mut errors),
            None => Some(Map::new()),
        };

        let input = match (params, pagination, body) {
            (Some(params), Some(pagination), Some(body)) => Some(ValidatedInput {
                params,
                body,
                pagination,
            }),
            _ => None,
        };
        finish(input, errors)
    }

    fn check_body(
        &self,
        schema: &Schema,
        raw: &RawBody,
        errors: &mut Vec<FieldError>,
    ) -> Option<Map<String, Value>> {
        let empty = Map::new();
        let object = match raw {
            RawBody::Empty => &empty,
            RawBody::Json(Value::Object(map)) => map,
            RawBody::Json(_) => {
                errors.push(FieldError::new(BODY_FIELD, EXPECTED_OBJECT));
                return None;
            }
            RawBody::Malformed(reason) => {
                debug!(%reason, "request body is not valid JSON");
                errors.push(FieldError::new(BODY_FIELD, MALFORMED_BODY));
                return None;
            }
        };
        schema.check_object("", object, self.strict, errors)
    }
}

fn finish<T>(value: Option<T>, errors: Vec<FieldError>) -> Result<T, ValidationFailure> {
    match ValidationFailure::from_errors(errors) {
        Some(failure) => Err(failure),
        None => value.ok_or_else(|| ValidationFailure::single(BODY_FIELD, EXPECTED_OBJECT)),
    }
}
