//! Page struct and constructors for cursor-paginated responses.

use serde::{Deserialize, Serialize};

/// Page size used when a caller asks for a page of zero items.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// One fetch result from a paged data source.
///
/// The serialized form matches the backend's paged response body:
///
/// ```json
/// {"items":[{"id":3}],"nextCursor":"3","hasNext":true}
/// ```
///
/// # Example
///
/// ```
/// use dishly_feed::Page;
///
/// let page = Page::new(vec![1, 2], Some("c1".to_string()), true);
/// assert!(!page.is_terminal());
///
/// let last = Page::last(vec![3]);
/// assert!(last.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Page<T> {
    /// Items of this page, in source order.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Opaque token to request the page after this one.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether the source claims more items follow this page.
    #[serde(default)]
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Create a page from its three parts.
    #[must_use]
    pub const fn new(items: Vec<T>, next_cursor: Option<String>, has_next: bool) -> Self {
        Self {
            items,
            next_cursor,
            has_next,
        }
    }

    /// Create the final page of a sequence.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self::new(items, None, false)
    }

    /// Create an empty final page.
    #[must_use]
    pub const fn empty() -> Self {
        Self::last(Vec::new())
    }

    /// Build a page from an over-fetched batch of rows.
    ///
    /// Keyset sources query `limit + 1` rows: the extra row only proves that
    /// another page exists and is dropped. The next cursor is derived from the
    /// last row that stays on the page. A `limit` of zero falls back to
    /// [`DEFAULT_PAGE_LIMIT`].
    ///
    /// ```
    /// use dishly_feed::Page;
    ///
    /// // limit 2, source returned 3 rows -> one more page exists
    /// let page = Page::from_overfetch(vec![30, 20, 10], 2, |id| id.to_string());
    /// assert_eq!(page.items, vec![30, 20]);
    /// assert_eq!(page.next_cursor.as_deref(), Some("20"));
    /// assert!(page.has_next);
    /// ```
    pub fn from_overfetch<F>(mut rows: Vec<T>, limit: usize, cursor_of: F) -> Self
    where
        F: FnOnce(&T) -> String,
    {
        let limit = if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit };
        let has_next = rows.len() > limit;
        rows.truncate(limit);

        let next_cursor = if has_next { rows.last().map(cursor_of) } else { None };

        Self::new(rows, next_cursor, has_next)
    }

    /// Whether a loader must stop after applying this page.
    ///
    /// A page is terminal when it says so, and also when it claims more data
    /// but carries no cursor to reach it: re-requesting with no cursor would
    /// restart the sequence from the first page.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.has_next || self.next_cursor.is_none()
    }

    /// Convert the item type, keeping the continuation metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_next: self.has_next,
        }
    }

    /// Number of items on this page.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page has no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
