//! The paged data source a loader pulls from.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::page::Page;

/// Message reported when a fetch fails without saying why.
pub const DEFAULT_FETCH_ERROR: &str = "could not load items";

/// A failed page fetch.
///
/// Carries the user-facing message a list view shows next to its retry
/// button. A failure without a message displays [`DEFAULT_FETCH_ERROR`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .message.as_deref().unwrap_or(DEFAULT_FETCH_ERROR))]
pub struct FetchError {
    message: Option<String>,
}

impl FetchError {
    /// Failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: (!message.trim().is_empty()).then_some(message),
        }
    }

    /// Failure that carries no message.
    #[must_use]
    pub const fn unspecified() -> Self {
        Self { message: None }
    }

    /// The message to show, falling back to [`DEFAULT_FETCH_ERROR`].
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_FETCH_ERROR)
    }

    /// Whether the failure carried its own message.
    #[must_use]
    pub const fn has_message(&self) -> bool {
        self.message.is_some()
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A source of cursor-addressed pages.
///
/// `cursor` is `None` for the first page and otherwise the `next_cursor` of
/// the previous page. Implementations must fail rather than return a
/// malformed page; cursor stability is the source's responsibility.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page that starts at `cursor`.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>, FetchError>;
}

/// A [`PageSource`] backed by an async closure. Created by [`source_fn`].
#[derive(Clone)]
pub struct FnSource<F> {
    f: F,
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

/// Turn an async closure into a [`PageSource`].
///
/// ```
/// use dishly_feed::{FetchError, Page, source_fn};
///
/// let source = source_fn(|cursor: Option<String>| async move {
///     match cursor.as_deref() {
///         None => Ok::<_, FetchError>(Page::new(vec![1, 2], Some("c1".to_string()), true)),
///         Some(_) => Ok(Page::last(vec![3])),
///     }
/// });
/// # let _ = source;
/// ```
pub const fn source_fn<F>(f: F) -> FnSource<F> {
    FnSource { f }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, FetchError>> + Send,
{
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>, FetchError> {
        (self.f)(cursor.map(str::to_string)).await
    }
}
