//! One page of an ordered result set.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::cursor::{Cursor, CursorCodec, CursorError, CursorKey};

/// Items served in one page plus the cursor for the next one.
///
/// ## Invariants
/// - `next_cursor` is present only when at least one more row follows the
///   last item of this page.
/// - [`Page::count`] is the size of this page, never a collection total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Assemble a page from parts the caller has already computed.
    pub const fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// A page with nothing after it.
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Build a page from rows fetched with `limit + 1` as the query limit.
    ///
    /// When more than `limit` rows arrive the surplus is discarded and the
    /// next cursor is minted from the last row kept; otherwise the page is
    /// final.
    ///
    /// # Errors
    /// Propagates [`CursorError::Serialise`] from the codec.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use pagination::{CursorCodec, CursorKey, CursorSecret, Page};
    ///
    /// let secret = CursorSecret::new(&[1_u8; 32]).expect("secret is long enough");
    /// let codec = CursorCodec::new("id", secret);
    /// let limit = NonZeroUsize::new(2).expect("non-zero");
    /// let page = Page::from_overfetch(vec![1_u32, 2, 3], limit, &codec, |row| {
    ///     CursorKey::new(*row, *row)
    /// })
    /// .expect("page builds");
    /// assert_eq!(page.items(), &[1, 2]);
    /// assert!(page.next_cursor().is_some());
    /// ```
    pub fn from_overfetch<S, K, F>(
        mut rows: Vec<T>,
        limit: NonZeroUsize,
        codec: &CursorCodec,
        key_of: F,
    ) -> Result<Self, CursorError>
    where
        S: Serialize,
        K: Serialize,
        F: Fn(&T) -> CursorKey<S, K>,
    {
        if rows.len() <= limit.get() {
            return Ok(Self::last(rows));
        }
        rows.truncate(limit.get());
        let next_cursor = rows
            .last()
            .map(|row| codec.encode(&key_of(row)))
            .transpose()?;
        Ok(Self {
            items: rows,
            next_cursor,
        })
    }

    /// Items in this page.
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Cursor for the following page, absent on the final page.
    pub const fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    /// Number of items in this page.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether this is the final page.
    pub const fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    /// Split into `(items, next_cursor)`.
    pub fn into_parts(self) -> (Vec<T>, Option<Cursor>) {
        (self.items, self.next_cursor)
    }

    /// Transform each item, keeping the cursor.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    /// Fallibly transform each item, keeping the cursor.
    ///
    /// # Errors
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            next_cursor: self.next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page assembly.

    use super::*;
    use crate::cursor::CursorSecret;
    use rstest::rstest;

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero limit")
    }

    fn codec() -> CursorCodec {
        let secret = CursorSecret::new(&[3_u8; 32]).expect("secret is long enough");
        CursorCodec::new("id", secret)
    }

    fn build(rows: Vec<u32>, n: usize) -> Page<u32> {
        let codec = codec();
        Page::from_overfetch(rows, limit(n), &codec, |row| CursorKey::new(*row, *row))
            .expect("page builds")
    }

    #[rstest]
    #[case::fewer_rows_than_limit(vec![1, 2], 3)]
    #[case::exactly_limit(vec![1, 2, 3], 3)]
    #[case::empty(vec![], 3)]
    fn short_fetches_produce_a_final_page(#[case] rows: Vec<u32>, #[case] n: usize) {
        let expected = rows.len();
        let page = build(rows, n);
        assert!(page.is_last());
        assert_eq!(page.count(), expected);
    }

    #[rstest]
    fn overfetch_trims_and_points_at_the_last_kept_row() {
        let page = build(vec![10, 11, 12, 13], 3);
        assert_eq!(page.items(), &[10, 11, 12]);
        let cursor = page.next_cursor().expect("next cursor present");
        let key: CursorKey<u32, u32> = codec().decode(cursor).expect("decode");
        assert_eq!(key.into_parts(), (12, 12));
    }

    #[rstest]
    fn map_preserves_cursor() {
        let page = build(vec![1, 2, 3], 2);
        let cursor = page.next_cursor().cloned();
        let mapped = page.map(|row| row.to_string());
        assert_eq!(mapped.items(), &["1".to_owned(), "2".to_owned()]);
        assert_eq!(mapped.next_cursor().cloned(), cursor);
    }

    #[rstest]
    fn try_map_surfaces_the_first_error() {
        let page = build(vec![1, 2], 5);
        let result: Result<Page<u32>, String> = page.try_map(|row| {
            if row == 2 {
                Err("two".to_owned())
            } else {
                Ok(row)
            }
        });
        assert_eq!(result, Err("two".to_owned()));
    }
}
