//! In-memory keyset-paginated source.
//!
//! Serves a fixed collection the way the platform's cursor endpoints do:
//! newest first, `limit + 1` rows per query, and the id of the last row of a
//! page as the next cursor. Useful for previews, demos and tests.

use std::fmt;

use async_trait::async_trait;
use tracing::trace;

use crate::page::Page;
use crate::source::{FetchError, PageSource};

/// Message of the error returned for a cursor that is not a key.
pub const INVALID_CURSOR: &str = "invalid cursor";

/// A [`PageSource`] over an owned collection ordered by a descending integer key.
///
/// # Example
///
/// ```
/// use dishly_feed::{KeysetSource, PageSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = KeysetSource::new((1..=5).collect::<Vec<i64>>(), |n| *n, 2);
///
/// let first = source.fetch_page(None).await.unwrap();
/// assert_eq!(first.items, vec![5, 4]);
/// assert_eq!(first.next_cursor.as_deref(), Some("4"));
///
/// let second = source.fetch_page(Some("4")).await.unwrap();
/// assert_eq!(second.items, vec![3, 2]);
/// # }
/// ```
pub struct KeysetSource<T> {
    rows: Vec<T>,
    key_of: fn(&T) -> i64,
    limit: usize,
}

impl<T> fmt::Debug for KeysetSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetSource")
            .field("rows", &self.rows.len())
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<T> KeysetSource<T> {
    /// Create a source serving `rows` in descending `key_of` order, `limit` per page.
    ///
    /// A `limit` of zero uses the default page size.
    pub fn new(mut rows: Vec<T>, key_of: fn(&T) -> i64, limit: usize) -> Self {
        rows.sort_by_key(|row| std::cmp::Reverse(key_of(row)));
        Self {
            rows,
            key_of,
            limit,
        }
    }

    /// Number of rows this source can serve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether this source has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Clone> KeysetSource<T> {
    /// Build the page after `cursor`.
    pub fn page_after(&self, cursor: Option<&str>) -> Result<Page<T>, FetchError> {
        let after = match cursor.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| FetchError::new(INVALID_CURSOR))?,
            ),
            None => None,
        };

        let key_of = self.key_of;
        let limit = if self.limit == 0 {
            crate::page::DEFAULT_PAGE_LIMIT
        } else {
            self.limit
        };
        let rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| after.is_none_or(|after| key_of(row) < after))
            .take(limit + 1)
            .cloned()
            .collect();

        trace!(after = ?after, fetched = rows.len(), limit, "keyset page");
        Ok(Page::from_overfetch(rows, limit, |row| key_of(row).to_string()))
    }
}

#[async_trait]
impl<T> PageSource<T> for KeysetSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>, FetchError> {
        self.page_after(cursor)
    }
}
