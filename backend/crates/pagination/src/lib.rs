//! Opaque cursor and page primitives shared by paginated endpoints.
//!
//! A [`Cursor`] names a resume position `(sort value, tie-breaker)` inside an
//! ordered result set. Callers treat it as an opaque string; only
//! [`CursorCodec`] reads or writes its contents.
//!
//! [`Page`] carries one page of items plus the cursor for the next page. A
//! missing cursor is the only signal that iteration has finished, so
//! [`Page::from_overfetch`] derives it from a query that fetched one row more
//! than the page limit.
//!
//! # Examples
//! ```
//! use pagination::{CursorCodec, CursorKey, CursorSecret};
//!
//! let secret = CursorSecret::new(&[42_u8; 32]).expect("secret is long enough");
//! let codec = CursorCodec::new("created_at", secret);
//! let cursor = codec
//!     .encode(&CursorKey::new(1_700_000_000_i64, "row-7".to_owned()))
//!     .expect("cursor encodes");
//! let key: CursorKey<i64, String> = codec.decode(&cursor).expect("cursor decodes");
//! assert_eq!(key.sort(), &1_700_000_000);
//! assert_eq!(key.tie_breaker(), "row-7");
//! ```

mod cursor;
mod page;

pub use cursor::{
    CURSOR_VERSION, Cursor, CursorCodec, CursorError, CursorKey, CursorSecret, MAX_CURSOR_LEN,
    MIN_SECRET_LEN, SECRET_BLOCK_LEN,
};
pub use page::Page;
