//! Pagination query parameters.
//!
//! Each endpoint fixes its pagination mode. Cursor endpoints accept `limit`
//! and `cursor`; offset endpoints accept `page` and `limit`. Supplying a
//! parameter from the other mode is a validation failure rather than being
//! silently ignored.
//!
//! Cursor endpoints declare the key types their tokens carry, so a cursor of
//! the wrong shape is rejected here, before any handler runs.

use std::fmt;
use std::num::NonZeroUsize;

use color_eyre::eyre::eyre;
use pagination::{CursorCodec, CursorError, CursorKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::FieldError;
use super::failure::Failure;
use super::request::RawRequest;

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";
/// Query parameter carrying the resume cursor.
pub const CURSOR_PARAM: &str = "cursor";
/// Query parameter carrying the one-based page number.
pub const PAGE_PARAM: &str = "page";

/// Page size used when a request supplies none.
pub const DEFAULT_PAGE_LIMIT: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};
/// Largest page size a request may ask for unless configured otherwise.
pub const DEFAULT_MAX_PAGE_LIMIT: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};

const INVALID_CURSOR: &str = "Invalid cursor";
const OFFSET_UNSUPPORTED: &str = "Offset pagination is not supported by this endpoint";
const CURSOR_UNSUPPORTED: &str = "Cursor pagination is not supported by this endpoint";
const POSITIVE_INTEGER: &str = "Must be a positive integer";

type ShapedDecode = fn(&CursorCodec, &str) -> Result<CursorKey<Value, Value>, CursorError>;

/// A cursor codec plus the key types its tokens must decode to.
#[derive(Clone)]
pub struct CursorShape {
    codec: CursorCodec,
    decode: ShapedDecode,
}

impl CursorShape {
    /// Cursors minted by `codec` whose sort value is an `S` and whose
    /// tie-breaker is a `T`.
    #[must_use]
    pub fn of<S, T>(codec: CursorCodec) -> Self
    where
        S: Serialize + DeserializeOwned,
        T: Serialize + DeserializeOwned,
    {
        Self {
            codec,
            decode: decode_as::<S, T>,
        }
    }

    /// Codec minting and reading the cursors.
    #[must_use]
    pub const fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    fn decode(&self, token: &str) -> Result<CursorKey<Value, Value>, CursorError> {
        (self.decode)(&self.codec, token)
    }
}

impl fmt::Debug for CursorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorShape")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

fn decode_as<S, T>(
    codec: &CursorCodec,
    token: &str,
) -> Result<CursorKey<Value, Value>, CursorError>
where
    S: Serialize + DeserializeOwned,
    T: Serialize + DeserializeOwned,
{
    let (sort, tie_breaker) = codec.decode_str::<S, T>(token)?.into_parts();
    let sort_value = serde_json::to_value(sort).map_err(|_| CursorError::Shape)?;
    let tie_value = serde_json::to_value(tie_breaker).map_err(|_| CursorError::Shape)?;
    Ok(CursorKey::new(sort_value, tie_value))
}

/// Pagination style an endpoint accepts.
#[derive(Debug, Clone)]
pub enum PaginationMode {
    /// Keyset pagination with cursors of a declared shape.
    Cursor(CursorShape),
    /// Page-number pagination.
    Offset,
}

impl PaginationMode {
    /// Keyset pagination over `codec` with `(S, T)` resume keys.
    #[must_use]
    pub fn cursor<S, T>(codec: CursorCodec) -> Self
    where
        S: Serialize + DeserializeOwned,
        T: Serialize + DeserializeOwned,
    {
        Self::Cursor(CursorShape::of::<S, T>(codec))
    }
}

/// Service-wide page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    default_limit: NonZeroUsize,
    max_limit: NonZeroUsize,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl PaginationPolicy {
    /// Build a policy; `None` when `default_limit` exceeds `max_limit`.
    #[must_use]
    pub fn new(default_limit: NonZeroUsize, max_limit: NonZeroUsize) -> Option<Self> {
        (default_limit <= max_limit).then_some(Self {
            default_limit,
            max_limit,
        })
    }

    /// Limit applied when the client supplies none.
    #[must_use]
    pub const fn default_limit(&self) -> NonZeroUsize {
        self.default_limit
    }

    /// Largest limit a client may request.
    #[must_use]
    pub const fn max_limit(&self) -> NonZeroUsize {
        self.max_limit
    }

    /// Parse the pagination parameters of `request` for `mode`.
    ///
    /// Problems are appended to `errors` in parameter order; `None` is
    /// returned when any were found.
    pub(crate) fn parse(
        &self,
        mode: &PaginationMode,
        request: &RawRequest,
        errors: &mut Vec<FieldError>,
    ) -> Option<PaginationRequest> {
        let before = errors.len();
        let limit = self.parse_limit(request.query(LIMIT_PARAM), errors);
        let parsed = match mode {
            PaginationMode::Cursor(shape) => {
                if request.query(PAGE_PARAM).is_some() {
                    errors.push(FieldError::new(PAGE_PARAM, OFFSET_UNSUPPORTED));
                }
                let after = request
                    .query(CURSOR_PARAM)
                    .and_then(|token| decode_cursor(shape, token, errors));
                limit.map(|size| PaginationRequest::Cursor {
                    limit: size,
                    after,
                    codec: shape.codec().clone(),
                })
            }
            PaginationMode::Offset => {
                if request.query(CURSOR_PARAM).is_some() {
                    errors.push(FieldError::new(CURSOR_PARAM, CURSOR_UNSUPPORTED));
                }
                let page = match request.query(PAGE_PARAM) {
                    None => Some(NonZeroUsize::MIN),
                    Some(raw) => parse_positive(raw).or_else(|| {
                        errors.push(FieldError::new(PAGE_PARAM, POSITIVE_INTEGER));
                        None
                    }),
                };
                limit
                    .zip(page)
                    .map(|(limit, page)| PaginationRequest::Offset { page, limit })
            }
        };
        (errors.len() == before).then_some(parsed).flatten()
    }

    fn parse_limit(&self, raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<NonZeroUsize> {
        let Some(raw) = raw else {
            return Some(self.default_limit);
        };
        match parse_positive(raw) {
            None => {
                errors.push(FieldError::new(LIMIT_PARAM, POSITIVE_INTEGER));
                None
            }
            Some(limit) if limit > self.max_limit => {
                errors.push(FieldError::new(
                    LIMIT_PARAM,
                    format!("Must be at most {}", self.max_limit),
                ));
                None
            }
            Some(limit) => Some(limit),
        }
    }
}

fn parse_positive(raw: &str) -> Option<NonZeroUsize> {
    raw.trim().parse::<NonZeroUsize>().ok()
}

fn decode_cursor(
    shape: &CursorShape,
    token: &str,
    errors: &mut Vec<FieldError>,
) -> Option<CursorKey<Value, Value>> {
    match shape.decode(token) {
        Ok(key) => Some(key),
        Err(err) => {
            debug!(
                error = %err,
                ordering = shape.codec().ordering(),
                "rejected pagination cursor"
            );
            errors.push(FieldError::new(CURSOR_PARAM, INVALID_CURSOR));
            None
        }
    }
}

/// Validated pagination parameters.
#[derive(Debug, Clone)]
pub enum PaginationRequest {
    /// Keyset request.
    Cursor {
        /// Page size.
        limit: NonZeroUsize,
        /// Resume position already checked against the declared shape;
        /// `None` for the first page.
        after: Option<CursorKey<Value, Value>>,
        /// Codec the cursor was decoded with, reused to mint the next one.
        codec: CursorCodec,
    },
    /// Offset request.
    Offset {
        /// One-based page number.
        page: NonZeroUsize,
        /// Page size.
        limit: NonZeroUsize,
    },
}

impl PaginationRequest {
    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> NonZeroUsize {
        match self {
            Self::Cursor { limit, .. } | Self::Offset { limit, .. } => *limit,
        }
    }

    /// Rows to fetch so [`pagination::Page::from_overfetch`] can tell whether
    /// another page exists.
    #[must_use]
    pub const fn fetch_limit(&self) -> usize {
        self.limit().get().saturating_add(1)
    }

    /// Rows to skip for offset requests; zero for cursor requests.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Cursor { .. } => 0,
            Self::Offset { page, limit } => (page.get() - 1).saturating_mul(limit.get()),
        }
    }

    /// Codec for minting the next cursor, when in cursor mode.
    #[must_use]
    pub const fn codec(&self) -> Option<&CursorCodec> {
        match self {
            Self::Cursor { codec, .. } => Some(codec),
            Self::Offset { .. } => None,
        }
    }

    /// Resume position converted to the endpoint's key types.
    ///
    /// The gate has already checked the cursor against the shape the
    /// endpoint declared.
    ///
    /// # Errors
    /// An internal fault when `S`/`T` differ from the declared shape.
    pub fn resume_key<S, T>(&self) -> Result<Option<CursorKey<S, T>>, Failure>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        let Self::Cursor {
            after: Some(key), ..
        } = self
        else {
            return Ok(None);
        };
        let mismatch = |err: serde_json::Error| {
            Failure::from(eyre!(
                "resume key does not match the declared cursor shape: {err}"
            ))
        };
        let sort = serde_json::from_value(key.sort().clone()).map_err(mismatch)?;
        let tie_breaker = serde_json::from_value(key.tie_breaker().clone()).map_err(mismatch)?;
        Ok(Some(CursorKey::new(sort, tie_breaker)))
    }
}

#[cfg(test)]
mod tests {
    //! Query parameter parsing coverage.

    use super::*;
    use pagination::CursorSecret;
    use rstest::{fixture, rstest};

    fn nz(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).expect("non-zero")
    }

    fn signed(ordering: &str) -> CursorCodec {
        let secret = CursorSecret::new(&[7_u8; 32]).expect("secret is long enough");
        CursorCodec::new(ordering, secret)
    }

    #[fixture]
    fn policy() -> PaginationPolicy {
        PaginationPolicy::new(nz(20), nz(100)).expect("valid policy")
    }

    #[fixture]
    fn codec() -> CursorCodec {
        signed("created_at")
    }

    fn by_label(codec: CursorCodec) -> PaginationMode {
        PaginationMode::cursor::<String, u32>(codec)
    }

    fn parse(
        policy: &PaginationPolicy,
        mode: &PaginationMode,
        request: &RawRequest,
    ) -> Result<PaginationRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        policy
            .parse(mode, request, &mut errors)
            .ok_or(errors)
    }

    #[rstest]
    fn default_limit_applies_without_parameters(policy: PaginationPolicy, codec: CursorCodec) {
        let parsed = parse(&policy, &by_label(codec), &RawRequest::new()).expect("parses");
        assert_eq!(parsed.limit(), nz(20));
        assert_eq!(parsed.fetch_limit(), 21);
        assert!(matches!(parsed.resume_key::<String, u32>(), Ok(None)));
    }

    #[rstest]
    #[case("0", "Must be a positive integer")]
    #[case("-3", "Must be a positive integer")]
    #[case("ten", "Must be a positive integer")]
    #[case("101", "Must be at most 100")]
    fn limits_outside_bounds_are_rejected(
        policy: PaginationPolicy,
        codec: CursorCodec,
        #[case] raw: &str,
        #[case] message: &str,
    ) {
        let request = RawRequest::new().with_query(LIMIT_PARAM, raw);
        let errors = parse(&policy, &by_label(codec), &request).expect_err("limit rejected");
        assert_eq!(errors, vec![FieldError::new(LIMIT_PARAM, message)]);
    }

    #[rstest]
    fn cursors_decode_into_resume_keys(policy: PaginationPolicy, codec: CursorCodec) {
        let token = codec
            .encode(&CursorKey::new("2024-05-01T00:00:00Z", 7_u32))
            .expect("encode");
        let request = RawRequest::new().with_query(CURSOR_PARAM, token.as_str());
        let parsed = parse(&policy, &by_label(codec), &request).expect("parses");
        let key = parsed
            .resume_key::<String, u32>()
            .expect("fits key types")
            .expect("cursor present");
        assert_eq!(key.sort(), "2024-05-01T00:00:00Z");
        assert_eq!(*key.tie_breaker(), 7);
    }

    #[rstest]
    fn cursors_of_the_wrong_shape_fail_parsing(policy: PaginationPolicy, codec: CursorCodec) {
        let token = codec.encode(&CursorKey::new(1, "x")).expect("encode");
        let request = RawRequest::new().with_query(CURSOR_PARAM, token.as_str());
        let errors = parse(&policy, &by_label(codec), &request).expect_err("shape rejected");
        assert_eq!(errors, vec![FieldError::new(CURSOR_PARAM, "Invalid cursor")]);
    }

    #[rstest]
    fn resume_keys_of_undeclared_types_are_internal_faults(
        policy: PaginationPolicy,
        codec: CursorCodec,
    ) {
        let token = codec
            .encode(&CursorKey::new("2024-05-01T00:00:00Z", 7_u32))
            .expect("encode");
        let request = RawRequest::new().with_query(CURSOR_PARAM, token.as_str());
        let parsed = parse(&policy, &by_label(codec), &request).expect("parses");
        let failure = parsed
            .resume_key::<i64, u32>()
            .expect_err("types differ from the declared shape");
        assert!(failure.is_unknown());
    }

    #[rstest]
    fn garbage_cursors_are_invalid(policy: PaginationPolicy, codec: CursorCodec) {
        let request = RawRequest::new().with_query(CURSOR_PARAM, "%%%not-a-cursor");
        let errors = parse(&policy, &by_label(codec), &request).expect_err("cursor rejected");
        assert_eq!(errors, vec![FieldError::new(CURSOR_PARAM, "Invalid cursor")]);
    }

    #[rstest]
    fn cursors_from_another_ordering_are_invalid(policy: PaginationPolicy, codec: CursorCodec) {
        let foreign = signed("name")
            .encode(&CursorKey::new("ada", 1_u32))
            .expect("encode");
        let request = RawRequest::new().with_query(CURSOR_PARAM, foreign.as_str());
        assert!(parse(&policy, &by_label(codec), &request).is_err());
    }

    #[rstest]
    fn page_is_rejected_on_cursor_endpoints(policy: PaginationPolicy, codec: CursorCodec) {
        let request = RawRequest::new().with_query(PAGE_PARAM, "2");
        let errors = parse(&policy, &by_label(codec), &request).expect_err("mode mismatch");
        assert_eq!(
            errors,
            vec![FieldError::new(
                PAGE_PARAM,
                "Offset pagination is not supported by this endpoint"
            )]
        );
    }

    #[rstest]
    fn cursor_is_rejected_on_offset_endpoints(policy: PaginationPolicy) {
        let request = RawRequest::new().with_query(CURSOR_PARAM, "abc");
        let errors =
            parse(&policy, &PaginationMode::Offset, &request).expect_err("mode mismatch");
        assert_eq!(
            errors,
            vec![FieldError::new(
                CURSOR_PARAM,
                "Cursor pagination is not supported by this endpoint"
            )]
        );
    }

    #[rstest]
    fn offsets_are_derived_from_page_and_limit(policy: PaginationPolicy) {
        let request = RawRequest::new()
            .with_query(PAGE_PARAM, "3")
            .with_query(LIMIT_PARAM, "10");
        let parsed = parse(&policy, &PaginationMode::Offset, &request).expect("parses");
        assert_eq!(parsed.offset(), 20);
        assert!(parsed.codec().is_none());
    }

    #[rstest]
    fn policies_reject_defaults_above_the_maximum() {
        assert!(PaginationPolicy::new(nz(50), nz(10)).is_none());
    }
}
