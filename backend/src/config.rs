//! Protocol configuration loaded via OrthoConfig.
//!
//! [`ProtocolSettings`] is the raw, layered input (CLI flags, `PROTOCOL_*`
//! environment variables, config files). [`ProtocolConfig`] is the checked
//! form shared read-only by every pipeline.
//!
//! Cursor tokens are signed with a server secret. Production mode requires
//! one; otherwise a random secret is generated per process, so cursors do not
//! survive a restart.

use std::net::SocketAddr;
use std::num::NonZeroUsize;

use ortho_config::OrthoConfig;
use pagination::{CursorCodec, CursorError, CursorSecret, MIN_SECRET_LEN, SECRET_BLOCK_LEN};
use rand::RngCore;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::paging::{DEFAULT_MAX_PAGE_LIMIT, DEFAULT_PAGE_LIMIT};
use crate::domain::validation::ValidationGate;
use crate::domain::{ErrorCatalogue, PaginationPolicy, ValidationStatus};

const DEFAULT_VALIDATION_STATUS: u16 = 400;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Raw configuration values controlling the protocol.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROTOCOL")]
pub struct ProtocolSettings {
    /// Redact internal fault descriptions in responses.
    #[ortho_config(default = false)]
    pub production_mode: bool,
    /// Reject unknown top-level body fields instead of dropping them.
    #[ortho_config(default = false)]
    pub strict_validation: bool,
    /// Page size used when a request supplies no `limit`.
    pub pagination_default_limit: Option<usize>,
    /// Largest `limit` a request may supply.
    pub pagination_max_limit: Option<usize>,
    /// Status for validation failures: 400 or 422.
    pub validation_status: Option<u16>,
    /// Socket address the demo server binds to.
    pub bind_addr: Option<String>,
    /// Secret signing pagination cursors; at least 32 bytes.
    pub cursor_secret: Option<String>,
}

impl ProtocolSettings {
    /// Configured default page size, falling back to the built-in default.
    #[must_use]
    pub fn pagination_default_limit(&self) -> usize {
        self.pagination_default_limit
            .unwrap_or(DEFAULT_PAGE_LIMIT.get())
    }

    /// Configured maximum page size, falling back to the built-in default.
    #[must_use]
    pub fn pagination_max_limit(&self) -> usize {
        self.pagination_max_limit
            .unwrap_or(DEFAULT_MAX_PAGE_LIMIT.get())
    }

    /// Configured validation status, falling back to 400.
    #[must_use]
    pub fn validation_status(&self) -> u16 {
        self.validation_status.unwrap_or(DEFAULT_VALIDATION_STATUS)
    }

    /// Configured bind address, falling back to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A page size was zero.
    #[error("{field} must be at least 1")]
    ZeroLimit {
        /// Offending setting.
        field: &'static str,
    },
    /// The default page size exceeds the maximum.
    #[error("pagination_default_limit ({default}) exceeds pagination_max_limit ({max})")]
    DefaultAboveMax {
        /// Configured default.
        default: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The validation status is neither 400 nor 422.
    #[error("validation_status must be 400 or 422, got {status}")]
    UnsupportedValidationStatus {
        /// Configured status.
        status: u16,
    },
    /// The bind address does not parse.
    #[error("bind_addr `{value}` is not a socket address")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
    },
    /// Production mode without a cursor secret.
    #[error("cursor_secret must be set in production mode")]
    MissingCursorSecret,
    /// The cursor secret is too short.
    #[error("cursor_secret must be at least {min} bytes, got {len}")]
    WeakCursorSecret {
        /// Supplied length in bytes.
        len: usize,
        /// Required length in bytes.
        min: usize,
    },
}

/// Checked protocol configuration.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    production_mode: bool,
    strict_validation: bool,
    pagination: PaginationPolicy,
    validation_status: ValidationStatus,
    bind_addr: SocketAddr,
    cursor_secret: CursorSecret,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            production_mode: false,
            strict_validation: false,
            pagination: PaginationPolicy::default(),
            validation_status: ValidationStatus::BadRequest,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cursor_secret: ephemeral_secret(),
        }
    }
}

fn ephemeral_secret() -> CursorSecret {
    let mut block = [0_u8; SECRET_BLOCK_LEN];
    rand::thread_rng().fill_bytes(&mut block);
    CursorSecret::from_block(block)
}

fn resolve_cursor_secret(settings: &ProtocolSettings) -> Result<CursorSecret, ConfigError> {
    match settings.cursor_secret.as_deref() {
        Some(secret) => CursorSecret::new(secret.as_bytes()).map_err(|err| match err {
            CursorError::WeakSecret { len, min } => ConfigError::WeakCursorSecret { len, min },
            _ => ConfigError::WeakCursorSecret {
                len: secret.len(),
                min: MIN_SECRET_LEN,
            },
        }),
        None if settings.production_mode => Err(ConfigError::MissingCursorSecret),
        None => {
            warn!("PROTOCOL_CURSOR_SECRET not set; cursors will not survive a restart");
            Ok(ephemeral_secret())
        }
    }
}

impl TryFrom<&ProtocolSettings> for ProtocolConfig {
    type Error = ConfigError;

    fn try_from(settings: &ProtocolSettings) -> Result<Self, Self::Error> {
        let default = NonZeroUsize::new(settings.pagination_default_limit()).ok_or(
            ConfigError::ZeroLimit {
                field: "pagination_default_limit",
            },
        )?;
        let max = NonZeroUsize::new(settings.pagination_max_limit()).ok_or(
            ConfigError::ZeroLimit {
                field: "pagination_max_limit",
            },
        )?;
        let pagination =
            PaginationPolicy::new(default, max).ok_or(ConfigError::DefaultAboveMax {
                default: default.get(),
                max: max.get(),
            })?;
        let status = settings.validation_status();
        let validation_status = ValidationStatus::from_u16(status)
            .ok_or(ConfigError::UnsupportedValidationStatus { status })?;
        let bind_addr = settings
            .bind_addr()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                value: settings.bind_addr().to_owned(),
            })?;
        let cursor_secret = resolve_cursor_secret(settings)?;
        Ok(Self {
            production_mode: settings.production_mode,
            strict_validation: settings.strict_validation,
            pagination,
            validation_status,
            bind_addr,
            cursor_secret,
        })
    }
}

impl ProtocolConfig {
    /// Copy with production mode switched on or off.
    #[must_use]
    pub const fn with_production_mode(mut self, production_mode: bool) -> Self {
        self.production_mode = production_mode;
        self
    }

    /// Copy with strict validation switched on or off.
    #[must_use]
    pub const fn with_strict_validation(mut self, strict_validation: bool) -> Self {
        self.strict_validation = strict_validation;
        self
    }

    /// Whether internal fault descriptions are redacted.
    #[must_use]
    pub const fn production_mode(&self) -> bool {
        self.production_mode
    }

    /// Whether unknown top-level fields are rejected.
    #[must_use]
    pub const fn strict_validation(&self) -> bool {
        self.strict_validation
    }

    /// Page size bounds.
    #[must_use]
    pub const fn pagination(&self) -> PaginationPolicy {
        self.pagination
    }

    /// Status policy for validation failures.
    #[must_use]
    pub const fn validation_status(&self) -> ValidationStatus {
        self.validation_status
    }

    /// Demo server bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Validation gate configured by this policy.
    #[must_use]
    pub const fn gate(&self) -> ValidationGate {
        ValidationGate::new(self.strict_validation, self.pagination)
    }

    /// Cursor codec for `ordering`, signed with the configured secret.
    #[must_use]
    pub fn cursor_codec(&self, ordering: &str) -> CursorCodec {
        CursorCodec::new(ordering, self.cursor_secret.clone())
    }

    /// Catalogue holding the standard codes under this validation policy.
    /// Register domain codes on the result.
    #[must_use]
    pub const fn catalogue(&self) -> ErrorCatalogue {
        ErrorCatalogue::new(self.validation_status)
    }
}
