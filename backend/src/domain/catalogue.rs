//! Versioned error-code catalogue and status mapping.
//!
//! The catalogue is built once at start-up, wrapped in an `Arc` and shared
//! read-only by every pipeline instance. Status codes are looked up here and
//! nowhere else.

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use thiserror::Error;

use super::error::{DomainCode, ErrorCode};

/// Version of the standard code set defined by [`ErrorCode::STANDARD`].
pub const CATALOGUE_VERSION: u32 = 1;

/// Status policy for validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStatus {
    /// Respond with `400 Bad Request`.
    #[default]
    BadRequest,
    /// Respond with `422 Unprocessable Entity`.
    UnprocessableEntity,
}

impl ValidationStatus {
    /// HTTP status applied to validation failures.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Map a configured numeric status onto the policy.
    #[must_use]
    pub const fn from_u16(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            422 => Some(Self::UnprocessableEntity),
            _ => None,
        }
    }
}

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// The name is not `SCREAMING_SNAKE_CASE`.
    #[error("error code `{name}` must be SCREAMING_SNAKE_CASE")]
    InvalidName {
        /// Rejected name.
        name: &'static str,
    },
    /// The name collides with a standard code.
    #[error("error code `{name}` is reserved")]
    Reserved {
        /// Rejected name.
        name: &'static str,
    },
    /// The status is not a client or server error.
    #[error("error code `{name}` must map to a 4xx or 5xx status, not {status}")]
    NotAnErrorStatus {
        /// Rejected name.
        name: &'static str,
        /// Offending status.
        status: StatusCode,
    },
    /// The name is already registered with another status.
    #[error("error code `{name}` is registered as {registered}, not {requested}")]
    ConflictingStatus {
        /// Code name.
        name: &'static str,
        /// Status already in the catalogue.
        registered: StatusCode,
        /// Status requested now.
        requested: StatusCode,
    },
}

/// Closed table of every error code a service may emit.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use api_protocol::domain::{DomainCode, ErrorCatalogue, ErrorCode, ValidationStatus};
///
/// const LOCKED: DomainCode = DomainCode::new("ROUTE_LOCKED", StatusCode::LOCKED);
/// let catalogue = ErrorCatalogue::new(ValidationStatus::UnprocessableEntity)
///     .register(LOCKED)
///     .expect("code registers");
/// assert_eq!(
///     catalogue.status_for(ErrorCode::ValidationError),
///     Some(StatusCode::UNPROCESSABLE_ENTITY)
/// );
/// assert_eq!(catalogue.status_for(ErrorCode::Domain(LOCKED)), Some(StatusCode::LOCKED));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCatalogue {
    validation: ValidationStatus,
    domain: BTreeMap<&'static str, StatusCode>,
}

impl Default for ErrorCatalogue {
    fn default() -> Self {
        Self::new(ValidationStatus::default())
    }
}

impl ErrorCatalogue {
    /// Catalogue holding the standard codes only.
    #[must_use]
    pub const fn new(validation: ValidationStatus) -> Self {
        Self {
            validation,
            domain: BTreeMap::new(),
        }
    }

    /// Register a domain code.
    ///
    /// Registering an identical code again is accepted.
    ///
    /// # Errors
    /// See [`CatalogueError`].
    pub fn register(mut self, code: DomainCode) -> Result<Self, CatalogueError> {
        let name = code.name();
        if !is_screaming_snake(name) {
            return Err(CatalogueError::InvalidName { name });
        }
        if ErrorCode::STANDARD.iter().any(|std| std.as_str() == name) {
            return Err(CatalogueError::Reserved { name });
        }
        let status = code.status();
        if !(status.is_client_error() || status.is_server_error()) {
            return Err(CatalogueError::NotAnErrorStatus { name, status });
        }
        match self.domain.get(name) {
            Some(registered) if *registered != status => {
                return Err(CatalogueError::ConflictingStatus {
                    name,
                    registered: *registered,
                    requested: status,
                });
            }
            Some(_) => {}
            None => {
                self.domain.insert(name, status);
            }
        }
        Ok(self)
    }

    /// Register several domain codes.
    ///
    /// # Errors
    /// Stops at the first [`CatalogueError`].
    pub fn register_all(
        self,
        codes: impl IntoIterator<Item = DomainCode>,
    ) -> Result<Self, CatalogueError> {
        codes.into_iter().try_fold(self, Self::register)
    }

    /// Status applied to validation failures.
    #[must_use]
    pub const fn validation_status(&self) -> StatusCode {
        self.validation.status()
    }

    /// Standard code set version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        CATALOGUE_VERSION
    }

    /// Status for a code, or `None` when a domain code was never registered.
    #[must_use]
    pub fn status_for(&self, code: ErrorCode) -> Option<StatusCode> {
        match code {
            ErrorCode::ValidationError => Some(self.validation.status()),
            ErrorCode::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ErrorCode::Forbidden => Some(StatusCode::FORBIDDEN),
            ErrorCode::NotFound => Some(StatusCode::NOT_FOUND),
            ErrorCode::Conflict => Some(StatusCode::CONFLICT),
            ErrorCode::ServiceUnavailable => Some(StatusCode::SERVICE_UNAVAILABLE),
            ErrorCode::InternalServerError => Some(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorCode::Domain(domain) => self
                .domain
                .get(domain.name())
                .copied()
                .filter(|status| *status == domain.status()),
        }
    }

    /// Registered domain codes in name order.
    pub fn domain_codes(&self) -> impl Iterator<Item = (&'static str, StatusCode)> + '_ {
        self.domain.iter().map(|(name, status)| (*name, *status))
    }
}

fn is_screaming_snake(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('_')
        && !name.ends_with('_')
        && !name.contains("__")
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    //! Catalogue registration and lookup coverage.

    use super::*;
    use rstest::rstest;

    const LOCKED: DomainCode = DomainCode::new("ROUTE_LOCKED", StatusCode::LOCKED);

    #[rstest]
    #[case(ValidationStatus::BadRequest, StatusCode::BAD_REQUEST)]
    #[case(ValidationStatus::UnprocessableEntity, StatusCode::UNPROCESSABLE_ENTITY)]
    fn validation_status_follows_policy(
        #[case] policy: ValidationStatus,
        #[case] expected: StatusCode,
    ) {
        let catalogue = ErrorCatalogue::new(policy);
        assert_eq!(
            catalogue.status_for(ErrorCode::ValidationError),
            Some(expected)
        );
    }

    #[rstest]
    fn internal_errors_are_always_500() {
        let catalogue = ErrorCatalogue::default();
        assert_eq!(
            catalogue.status_for(ErrorCode::InternalServerError),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[rstest]
    fn unregistered_domain_codes_have_no_status() {
        let catalogue = ErrorCatalogue::default();
        assert_eq!(catalogue.status_for(ErrorCode::Domain(LOCKED)), None);
    }

    #[rstest]
    fn same_name_declared_with_another_status_is_not_resolved() {
        let catalogue = ErrorCatalogue::default()
            .register(LOCKED)
            .expect("registers");
        let impostor = DomainCode::new("ROUTE_LOCKED", StatusCode::BAD_REQUEST);
        assert_eq!(catalogue.status_for(ErrorCode::Domain(impostor)), None);
    }

    #[rstest]
    fn re_registering_identical_code_is_accepted() {
        let catalogue = ErrorCatalogue::default()
            .register_all([LOCKED, LOCKED])
            .expect("idempotent registration");
        assert_eq!(catalogue.domain_codes().count(), 1);
    }

    #[rstest]
    fn conflicting_registration_is_rejected() {
        let result = ErrorCatalogue::default().register_all([
            LOCKED,
            DomainCode::new("ROUTE_LOCKED", StatusCode::CONFLICT),
        ]);
        assert_eq!(
            result,
            Err(CatalogueError::ConflictingStatus {
                name: "ROUTE_LOCKED",
                registered: StatusCode::LOCKED,
                requested: StatusCode::CONFLICT,
            })
        );
    }

    #[rstest]
    #[case::lowercase("route_locked")]
    #[case::leading_underscore("_LOCKED")]
    #[case::double_underscore("ROUTE__LOCKED")]
    #[case::empty("")]
    fn malformed_names_are_rejected(#[case] name: &'static str) {
        let result = ErrorCatalogue::default().register(DomainCode::new(name, StatusCode::CONFLICT));
        assert_eq!(result, Err(CatalogueError::InvalidName { name }));
    }

    #[rstest]
    fn standard_names_are_reserved() {
        let result = ErrorCatalogue::default()
            .register(DomainCode::new("NOT_FOUND", StatusCode::GONE));
        assert_eq!(result, Err(CatalogueError::Reserved { name: "NOT_FOUND" }));
    }

    #[rstest]
    fn success_statuses_are_rejected() {
        let result =
            ErrorCatalogue::default().register(DomainCode::new("ALL_GOOD", StatusCode::OK));
        assert_eq!(
            result,
            Err(CatalogueError::NotAnErrorStatus {
                name: "ALL_GOOD",
                status: StatusCode::OK,
            })
        );
    }
}
