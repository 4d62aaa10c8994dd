//! Versioned opaque cursor encoding.
//!
//! Token layout before base64url (no padding) encoding:
//!
//! ```text
//! [version: 1 byte][tag: 16 bytes][payload: JSON {"k": key, "s": sort, "t": tie}]
//! ```
//!
//! `tag` is the leading sixteen bytes of `HMAC-SHA256(secret, version ||
//! payload)`. Only holders of the [`CursorSecret`] can mint a token that
//! decodes, so clients cannot forge or edit resume positions. The payload
//! holds only the ordering name, the sort value and the tie-breaker of the
//! last row served.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Format version written into every cursor.
pub const CURSOR_VERSION: u8 = 1;

/// Longest token [`CursorCodec::decode`] will inspect.
pub const MAX_CURSOR_LEN: usize = 512;

/// Shortest secret [`CursorSecret::new`] accepts, in bytes.
pub const MIN_SECRET_LEN: usize = 32;
/// Length of a full HMAC-SHA256 key block.
pub const SECRET_BLOCK_LEN: usize = 64;

const TAG_LEN: usize = 16;

type CursorMac = Hmac<Sha256>;

/// Opaque pagination token handed to clients.
///
/// The wrapped string is URL safe. Holding a `Cursor` says nothing about its
/// validity; only [`CursorCodec::decode`] establishes that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from a client.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consume the cursor, returning the raw token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resume position inside an ordered result set.
///
/// `sort` is the value of the ordering column for the last row served;
/// `tie_breaker` disambiguates rows sharing that value so continuation
/// follows a strict total order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorKey<S, T> {
    sort: S,
    tie_breaker: T,
}

impl<S, T> CursorKey<S, T> {
    /// Build a key from the last row's sort value and unique tie-breaker.
    pub const fn new(sort: S, tie_breaker: T) -> Self {
        Self { sort, tie_breaker }
    }

    /// Sort value of the last row served.
    pub const fn sort(&self) -> &S {
        &self.sort
    }

    /// Tie-breaker of the last row served.
    pub const fn tie_breaker(&self) -> &T {
        &self.tie_breaker
    }

    /// Split the key into `(sort, tie_breaker)`.
    pub fn into_parts(self) -> (S, T) {
        (self.sort, self.tie_breaker)
    }
}

/// Reasons a cursor cannot be produced or read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The token exceeds [`MAX_CURSOR_LEN`].
    #[error("cursor is {len} characters long; at most {max} are accepted")]
    TooLong {
        /// Length of the rejected token.
        len: usize,
        /// Accepted maximum.
        max: usize,
    },
    /// The token is not base64url text.
    #[error("cursor is not valid base64url")]
    Encoding,
    /// The decoded bytes are shorter than the fixed header.
    #[error("cursor is truncated")]
    Truncated,
    /// The token was written by an unknown format version.
    #[error("cursor version {found} is not supported")]
    UnsupportedVersion {
        /// Version byte found in the token.
        found: u8,
    },
    /// The integrity tag does not match the payload.
    #[error("cursor integrity check failed")]
    Tampered,
    /// The token was minted for a different ordering.
    #[error("cursor was issued for ordering `{found}`, expected `{expected}`")]
    KeyMismatch {
        /// Ordering this codec serves.
        expected: String,
        /// Ordering recorded in the token.
        found: String,
    },
    /// The payload does not have the sort key shape the caller expects.
    #[error("cursor payload does not match the expected key shape")]
    Shape,
    /// The key could not be serialised while encoding.
    #[error("cursor key could not be serialised: {message}")]
    Serialise {
        /// Serializer failure description.
        message: String,
    },
    /// The signing secret is too short.
    #[error("cursor secret is {len} bytes long; at least {min} are required")]
    WeakSecret {
        /// Length of the rejected secret.
        len: usize,
        /// Required minimum.
        min: usize,
    },
}

/// Server-side key signing every cursor.
///
/// Tokens minted under one secret are refused under any other, so rotating
/// the secret invalidates every outstanding cursor.
#[derive(Clone)]
pub struct CursorSecret {
    mac: CursorMac,
}

impl CursorSecret {
    /// Key cursors with `bytes`.
    ///
    /// # Errors
    /// Returns [`CursorError::WeakSecret`] when `bytes` is shorter than
    /// [`MIN_SECRET_LEN`].
    pub fn new(bytes: &[u8]) -> Result<Self, CursorError> {
        let weak = || CursorError::WeakSecret {
            len: bytes.len(),
            min: MIN_SECRET_LEN,
        };
        if bytes.len() < MIN_SECRET_LEN {
            return Err(weak());
        }
        let mac = CursorMac::new_from_slice(bytes).map_err(|_| weak())?;
        Ok(Self { mac })
    }

    /// Key cursors with one full HMAC block, as produced by a random source.
    #[must_use]
    pub fn from_block(block: [u8; SECRET_BLOCK_LEN]) -> Self {
        let mut key = Key::<CursorMac>::default();
        key.copy_from_slice(&block);
        Self {
            mac: <CursorMac as Mac>::new(&key),
        }
    }

    fn tag(&self, version: u8, payload: &[u8]) -> CursorMac {
        let mut mac = self.mac.clone();
        mac.update(&[version]);
        mac.update(payload);
        mac
    }
}

impl fmt::Debug for CursorSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CursorSecret(..)")
    }
}

#[derive(Serialize)]
struct PayloadRef<'a, S, T> {
    k: &'a str,
    s: &'a S,
    t: &'a T,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PayloadOwned {
    k: String,
    s: Value,
    t: Value,
}

/// Encoder/decoder for cursors over one named ordering.
///
/// The ordering name (for example `created_at`) is embedded in each token so
/// a cursor minted for one sort order is refused by an endpoint sorting by
/// another.
#[derive(Debug, Clone)]
pub struct CursorCodec {
    ordering: String,
    secret: CursorSecret,
}

impl CursorCodec {
    /// Create a codec for the named ordering, signing with `secret`.
    pub fn new(ordering: impl Into<String>, secret: CursorSecret) -> Self {
        Self {
            ordering: ordering.into(),
            secret,
        }
    }

    /// Ordering name embedded in minted cursors.
    #[must_use]
    pub fn ordering(&self) -> &str {
        self.ordering.as_str()
    }

    /// Encode a resume position.
    ///
    /// Encoding the same key twice yields the same token.
    ///
    /// # Errors
    /// Returns [`CursorError::Serialise`] when the key cannot be written as
    /// JSON (for example a map with non-string keys).
    pub fn encode<S, T>(&self, key: &CursorKey<S, T>) -> Result<Cursor, CursorError>
    where
        S: Serialize,
        T: Serialize,
    {
        let payload = serde_json::to_vec(&PayloadRef {
            k: &self.ordering,
            s: &key.sort,
            t: &key.tie_breaker,
        })
        .map_err(|err| CursorError::Serialise {
            message: err.to_string(),
        })?;

        let tag = self
            .secret
            .tag(CURSOR_VERSION, &payload)
            .finalize()
            .into_bytes();
        let mut bytes = Vec::with_capacity(1 + TAG_LEN + payload.len());
        bytes.push(CURSOR_VERSION);
        bytes.extend(tag.iter().take(TAG_LEN));
        bytes.extend_from_slice(&payload);
        Ok(Cursor(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Decode a cursor back into its resume position.
    ///
    /// Every failure is reported as a [`CursorError`]; attacker-controlled
    /// input never panics.
    ///
    /// # Errors
    /// See [`CursorError`] for the individual rejection reasons.
    pub fn decode<S, T>(&self, cursor: &Cursor) -> Result<CursorKey<S, T>, CursorError>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        self.decode_str(cursor.as_str())
    }

    /// Decode a raw token, as received in a query string.
    ///
    /// # Errors
    /// See [`CursorError`] for the individual rejection reasons.
    pub fn decode_str<S, T>(&self, token: &str) -> Result<CursorKey<S, T>, CursorError>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        if token.len() > MAX_CURSOR_LEN {
            return Err(CursorError::TooLong {
                len: token.len(),
                max: MAX_CURSOR_LEN,
            });
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Encoding)?;
        let (&version, rest) = bytes.split_first().ok_or(CursorError::Truncated)?;
        if version != CURSOR_VERSION {
            return Err(CursorError::UnsupportedVersion { found: version });
        }
        let (tag, payload) = rest
            .split_at_checked(TAG_LEN)
            .ok_or(CursorError::Truncated)?;
        self.secret
            .tag(version, payload)
            .verify_truncated_left(tag)
            .map_err(|_| CursorError::Tampered)?;

        let decoded: PayloadOwned =
            serde_json::from_slice(payload).map_err(|_| CursorError::Shape)?;
        if decoded.k != self.ordering {
            return Err(CursorError::KeyMismatch {
                expected: self.ordering.clone(),
                found: decoded.k,
            });
        }
        let sort = serde_json::from_value(decoded.s).map_err(|_| CursorError::Shape)?;
        let tie_breaker = serde_json::from_value(decoded.t).map_err(|_| CursorError::Shape)?;
        Ok(CursorKey { sort, tie_breaker })
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for cursor encoding and rejection paths.

    use super::*;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn secret(fill: u8) -> CursorSecret {
        CursorSecret::new(&[fill; MIN_SECRET_LEN]).expect("secret long enough")
    }

    #[fixture]
    fn codec() -> CursorCodec {
        CursorCodec::new("created_at", secret(7))
    }

    fn signed_tag(version: u8, payload: &[u8]) -> Vec<u8> {
        let tag = secret(7).tag(version, payload).finalize().into_bytes();
        tag.iter().take(TAG_LEN).copied().collect()
    }

    fn raw_token(version: u8, payload: &[u8], tag: &[u8]) -> String {
        let mut bytes = vec![version];
        bytes.extend_from_slice(tag);
        bytes.extend_from_slice(payload);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    #[rstest]
    fn round_trips_sort_value_and_tie_breaker(codec: CursorCodec) {
        let key = CursorKey::new("2026-01-15T12:00:00Z".to_owned(), 42_u64);
        let cursor = codec.encode(&key).expect("encode");
        let decoded: CursorKey<String, u64> = codec.decode(&cursor).expect("decode");
        assert_eq!(decoded, key);
    }

    #[rstest]
    fn re_encoding_a_decoded_cursor_is_stable(codec: CursorCodec) {
        let cursor = codec
            .encode(&CursorKey::new(7_i64, "b".to_owned()))
            .expect("encode");
        let decoded: CursorKey<i64, String> = codec.decode(&cursor).expect("decode");
        let again = codec.encode(&decoded).expect("re-encode");
        assert_eq!(again, cursor);
    }

    #[rstest]
    fn tokens_are_url_safe(codec: CursorCodec) {
        let cursor = codec
            .encode(&CursorKey::new("ü/+?&=".to_owned(), "id/with/slashes".to_owned()))
            .expect("encode");
        assert!(
            cursor
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::not_base64("***")]
    #[case::one_byte("AQ")]
    fn rejects_short_or_non_base64_tokens(codec: CursorCodec, #[case] token: &str) {
        let result = codec.decode_str::<i64, String>(token);
        assert!(matches!(
            result,
            Err(CursorError::Encoding | CursorError::Truncated)
        ));
    }

    #[rstest]
    fn rejects_overlong_tokens(codec: CursorCodec) {
        let token = "A".repeat(MAX_CURSOR_LEN + 1);
        let result = codec.decode_str::<i64, String>(&token);
        assert_eq!(
            result,
            Err(CursorError::TooLong {
                len: MAX_CURSOR_LEN + 1,
                max: MAX_CURSOR_LEN
            })
        );
    }

    #[rstest]
    fn rejects_unknown_versions(codec: CursorCodec) {
        let payload = br#"{"k":"created_at","s":1,"t":"a"}"#;
        let token = raw_token(9, payload, &signed_tag(9, payload));
        let result = codec.decode_str::<i64, String>(&token);
        assert_eq!(result, Err(CursorError::UnsupportedVersion { found: 9 }));
    }

    #[rstest]
    fn rejects_edited_payloads(codec: CursorCodec) {
        let original = br#"{"k":"created_at","s":1,"t":"a"}"#;
        let edited = br#"{"k":"created_at","s":2,"t":"a"}"#;
        let token = raw_token(
            CURSOR_VERSION,
            edited,
            &signed_tag(CURSOR_VERSION, original),
        );
        let result = codec.decode_str::<i64, String>(&token);
        assert_eq!(result, Err(CursorError::Tampered));
    }

    #[rstest]
    fn rejects_cursors_for_other_orderings(codec: CursorCodec) {
        let other = CursorCodec::new("name", secret(7));
        let cursor = other
            .encode(&CursorKey::new("ada".to_owned(), "1".to_owned()))
            .expect("encode");
        let result = codec.decode::<String, String>(&cursor);
        assert_eq!(
            result,
            Err(CursorError::KeyMismatch {
                expected: "created_at".to_owned(),
                found: "name".to_owned(),
            })
        );
    }

    #[rstest]
    fn rejects_unexpected_sort_shapes(codec: CursorCodec) {
        let cursor = codec
            .encode(&CursorKey::new("not-a-number".to_owned(), "1".to_owned()))
            .expect("encode");
        let result = codec.decode::<i64, String>(&cursor);
        assert_eq!(result, Err(CursorError::Shape));
    }

    #[rstest]
    fn rejects_payloads_with_extra_fields(codec: CursorCodec) {
        let payload = br#"{"k":"created_at","s":1,"t":"a","total":99}"#;
        let token = raw_token(
            CURSOR_VERSION,
            payload,
            &signed_tag(CURSOR_VERSION, payload),
        );
        let result = codec.decode_str::<i64, String>(&token);
        assert_eq!(result, Err(CursorError::Shape));
    }

    #[rstest]
    fn rejects_cursors_minted_under_another_secret(codec: CursorCodec) {
        let forged = CursorCodec::new("created_at", secret(9))
            .encode(&CursorKey::new("1970-01-01T00:00:00Z".to_owned(), 0_u64))
            .expect("encode");
        let result = codec.decode::<String, u64>(&forged);
        assert_eq!(result, Err(CursorError::Tampered));
    }

    #[rstest]
    fn rejects_unsigned_payloads(codec: CursorCodec) {
        let payload = br#"{"k":"created_at","s":1,"t":"a"}"#;
        let token = raw_token(CURSOR_VERSION, payload, &[0_u8; TAG_LEN]);
        let result = codec.decode_str::<i64, String>(&token);
        assert_eq!(result, Err(CursorError::Tampered));
    }

    #[rstest]
    fn short_secrets_are_refused() {
        let result = CursorSecret::new(b"hunter2");
        assert!(matches!(
            result,
            Err(CursorError::WeakSecret { len: 7, min: MIN_SECRET_LEN })
        ));
    }

    #[rstest]
    fn secrets_do_not_leak_through_debug() {
        assert_eq!(format!("{:?}", secret(1)), "CursorSecret(..)");
    }

    #[rstest]
    fn block_secrets_sign_like_slice_secrets() {
        let block = [0x42_u8; SECRET_BLOCK_LEN];
        let minted = CursorCodec::new("created_at", CursorSecret::from_block(block))
            .encode(&CursorKey::new(1_i64, "a"))
            .expect("encode");
        let sliced = CursorSecret::new(&block).expect("long enough");
        let decoded: CursorKey<i64, String> = CursorCodec::new("created_at", sliced)
            .decode(&minted)
            .expect("same key verifies");
        assert_eq!(*decoded.sort(), 1);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(sort in any::<i64>(), tie in "[a-zA-Z0-9-]{1,36}") {
            let codec = CursorCodec::new("created_at", secret(7));
            let key = CursorKey::new(sort, tie);
            let cursor = codec.encode(&key).expect("encode");
            let decoded: CursorKey<i64, String> = codec.decode(&cursor).expect("decode");
            prop_assert_eq!(decoded, key);
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let codec = CursorCodec::new("created_at", secret(7));
            let token = URL_SAFE_NO_PAD.encode(&bytes);
            let _ = codec.decode_str::<i64, String>(&token);
        }

        #[test]
        fn arbitrary_text_never_panics(token in "\\PC{0,600}") {
            let codec = CursorCodec::new("created_at", secret(7));
            let _ = codec.decode_str::<String, String>(&token);
        }
    }
}
