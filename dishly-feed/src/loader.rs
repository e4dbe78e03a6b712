//! Incremental list loading over a [`PageSource`].
//!
//! A [`FeedLoader`] owns the ordered, deduplicated list behind one list view
//! (a search result, a profile tab, the home feed) and pulls pages into it on
//! demand.
//!
//! # Epochs
//!
//! Every loader carries an epoch counter. A fetch captures the epoch when it
//! starts and claims the loader's single in-flight slot for that epoch.
//! [`FeedLoader::reset`] bumps the epoch and drops the claim, so:
//!
//! - a second `load_more` while a claim is held is a no-op (single flight);
//! - a fetch that resolves after a reset sees a newer epoch and its result is
//!   discarded without touching state;
//! - a stale fetch never releases the claim of the fetch that replaced it.
//!
//! The network request itself is never aborted; only its effect is.
//!
//! # Example
//!
//! ```
//! use dishly_feed::{FeedLoader, FetchError, ItemKey, Page, source_fn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = source_fn(|cursor: Option<String>| async move {
//!     match cursor.as_deref() {
//!         None => Ok::<_, FetchError>(Page::new(vec![1_i64, 2], Some("c1".to_string()), true)),
//!         Some(_) => Ok(Page::last(vec![3])),
//!     }
//! });
//!
//! let loader = FeedLoader::with_key_fn(source, |n: &i64| Some(ItemKey::Int(*n)));
//! if let Some(first) = loader.start() {
//!     first.await.ok();
//! }
//! loader.load_more().await;
//!
//! assert_eq!(loader.snapshot().items, vec![1, 2, 3]);
//! assert!(!loader.has_next());
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::identity::{self, ItemKey, KeyFn, Keyed, append_deduped};
use crate::page::Page;
use crate::source::{FetchError, PageSource};

/// What a single [`FeedLoader::load_more`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadOutcome {
    /// Another fetch was already in flight; nothing was requested.
    Busy,
    /// The source has no more pages; nothing was requested.
    Exhausted,
    /// A page was applied.
    Appended {
        /// Items kept after deduplication.
        added: usize,
    },
    /// The fetch failed. Its message is now the loader's error.
    Failed(FetchError),
    /// The loader was reset while the fetch was outstanding; its result was dropped.
    Discarded,
}

impl LoadOutcome {
    /// Whether this call reached the page source.
    #[must_use]
    pub const fn fetched(&self) -> bool {
        matches!(
            self,
            Self::Appended { .. } | Self::Failed(_) | Self::Discarded
        )
    }
}

/// Point-in-time copy of a loader's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FeedSnapshot<T> {
    /// Loaded items in arrival order, unique by id.
    pub items: Vec<T>,
    /// Cursor the next fetch will send.
    pub cursor: Option<String>,
    /// Whether another page may be requested.
    pub has_next: bool,
    /// Whether a fetch is outstanding.
    pub is_loading: bool,
    /// Message of the last failed fetch.
    pub error: Option<String>,
    /// Current epoch; advances on every reset.
    pub epoch: u64,
}

struct FeedState<T> {
    items: Vec<T>,
    cursor: Option<String>,
    has_next: bool,
    error: Option<String>,
    epoch: u64,
    in_flight: Option<u64>,
    auto_load_pending: bool,
}

impl<T> FeedState<T> {
    const fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_next: true,
            error: None,
            epoch: 0,
            in_flight: None,
            auto_load_pending: true,
        }
    }

    /// Claim the in-flight slot, or say why no fetch may start.
    fn begin(&mut self) -> Result<(u64, Option<String>), LoadOutcome> {
        if self.in_flight.is_some() {
            return Err(LoadOutcome::Busy);
        }
        if !self.has_next {
            return Err(LoadOutcome::Exhausted);
        }
        self.in_flight = Some(self.epoch);
        self.error = None;
        Ok((self.epoch, self.cursor.clone()))
    }

    fn apply(&mut self, page: Page<T>, key_of: &(dyn Fn(&T) -> Option<ItemKey> + Send + Sync)) -> usize {
        if page.has_next && page.next_cursor.is_none() {
            warn!(
                epoch = self.epoch,
                "page claims more items but has no cursor; treating it as the last page"
            );
        }
        let terminal = page.is_terminal();
        let added = append_deduped(&mut self.items, page.items, key_of);
        self.cursor = page.next_cursor;
        self.has_next = !terminal;
        self.auto_load_pending = false;
        added
    }

    fn clear(&mut self) {
        self.epoch += 1;
        self.items.clear();
        self.cursor = None;
        self.has_next = true;
        self.error = None;
        self.in_flight = None;
        self.auto_load_pending = false;
    }
}

struct Shared<T> {
    source: Arc<dyn PageSource<T>>,
    key_of: KeyFn<T>,
    state: Mutex<FeedState<T>>,
    revision: watch::Sender<u64>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, FeedState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

/// Releases a fetch's in-flight claim when the fetch future is dropped early.
struct FlightClaim<'a, T> {
    shared: &'a Shared<T>,
    epoch: u64,
}

impl<T> Drop for FlightClaim<'_, T> {
    fn drop(&mut self) {
        let released = {
            let mut state = self.shared.lock();
            if state.in_flight == Some(self.epoch) {
                state.in_flight = None;
                true
            } else {
                false
            }
        };
        if released {
            debug!(epoch = self.epoch, "fetch dropped before completion");
            self.shared.notify();
        }
    }
}

/// Drives paged retrieval of one list from a [`PageSource`].
///
/// Cloning yields another handle to the same list, which is how a UI event
/// handler and a spawned task share one loader.
pub struct FeedLoader<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for FeedLoader<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for FeedLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("FeedLoader")
            .field("len", &state.items.len())
            .field("cursor", &state.cursor)
            .field("has_next", &state.has_next)
            .field("is_loading", &state.in_flight.is_some())
            .field("error", &state.error)
            .field("epoch", &state.epoch)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> FeedLoader<T> {
    /// Create a loader from a shared source and identity function.
    pub fn from_parts(source: Arc<dyn PageSource<T>>, key_of: KeyFn<T>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                source,
                key_of,
                state: Mutex::new(FeedState::new()),
                revision,
            }),
        }
    }

    /// Create a loader that identifies items with `key_of`.
    pub fn with_key_fn<S, F>(source: S, key_of: F) -> Self
    where
        S: PageSource<T> + 'static,
        F: Fn(&T) -> Option<ItemKey> + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(source), Arc::new(key_of))
    }

    /// Create a loader for items that carry their own id.
    pub fn keyed<S>(source: S) -> Self
    where
        S: PageSource<T> + 'static,
        T: Keyed,
    {
        Self::from_parts(Arc::new(source), identity::keyed())
    }

    /// Create a loader that keeps every item, duplicates included.
    pub fn unkeyed<S>(source: S) -> Self
    where
        S: PageSource<T> + 'static,
    {
        Self::from_parts(Arc::new(source), identity::unkeyed())
    }

    /// Run the automatic first load.
    ///
    /// Spawns one [`load_more`](Self::load_more) on the current Tokio runtime
    /// while the loader has not yet applied a page. Returns `None` once a page
    /// has been applied, once the automatic load has been spawned, or when no
    /// runtime is available (the load then stays pending). After a
    /// [`reset`](Self::reset) the reload is already running.
    pub fn start(&self) -> Option<JoinHandle<LoadOutcome>> {
        let runtime = {
            let mut state = self.shared.lock();
            if !state.auto_load_pending {
                return None;
            }
            let runtime = current_runtime();
            if runtime.is_some() {
                state.auto_load_pending = false;
            }
            runtime
        };
        runtime.map(|handle| self.spawn_load(&handle))
    }

    /// Fetch and append the next page.
    ///
    /// Does nothing while another fetch is outstanding or once the source is
    /// exhausted, so it is safe to call from every scroll event. Failures are
    /// stored as the loader's error and leave items, cursor and `has_next`
    /// untouched; calling again retries with the same cursor.
    pub async fn load_more(&self) -> LoadOutcome {
        let shared = &*self.shared;

        let (epoch, cursor) = match shared.lock().begin() {
            Ok(claim) => claim,
            Err(skipped) => return skipped,
        };
        shared.notify();
        let claim = FlightClaim { shared, epoch };

        debug!(
            epoch,
            cursor = cursor.as_deref().unwrap_or("<first>"),
            "fetching page"
        );
        let result = shared.source.fetch_page(cursor.as_deref()).await;

        let outcome = {
            let mut state = shared.lock();
            if state.epoch == epoch {
                state.in_flight = None;
                match result {
                    Ok(page) => {
                        let added = state.apply(page, &*shared.key_of);
                        debug!(
                            epoch,
                            added,
                            total = state.items.len(),
                            has_next = state.has_next,
                            "page applied"
                        );
                        LoadOutcome::Appended { added }
                    },
                    Err(err) => {
                        warn!(epoch, error = %err, "page fetch failed");
                        state.error = Some(err.message().to_string());
                        LoadOutcome::Failed(err)
                    },
                }
            } else {
                debug!(
                    epoch,
                    current = state.epoch,
                    "discarding page fetched before reset"
                );
                LoadOutcome::Discarded
            }
        };
        drop(claim);

        if outcome != LoadOutcome::Discarded {
            shared.notify();
        }
        outcome
    }

    /// Re-initialize the list in place and reload its first page.
    ///
    /// Clears items, cursor and error, re-enables loading, and invalidates any
    /// fetch still outstanding. Returns the handle of the single automatic
    /// reload.
    ///
    /// Outside a Tokio runtime the list is still cleared, no reload is
    /// spawned and `None` is returned; the next [`start`](Self::start) runs
    /// the reload.
    pub fn reset(&self) -> Option<JoinHandle<LoadOutcome>> {
        let runtime = current_runtime();
        {
            let mut state = self.shared.lock();
            state.clear();
            state.auto_load_pending = runtime.is_none();
            debug!(epoch = state.epoch, "feed reset");
        }
        self.shared.notify();
        runtime.map(|handle| self.spawn_load(&handle))
    }

    fn spawn_load(&self, runtime: &Handle) -> JoinHandle<LoadOutcome> {
        let this = self.clone();
        runtime.spawn(async move { this.load_more().await })
    }
}

fn current_runtime() -> Option<Handle> {
    let handle = Handle::try_current().ok();
    if handle.is_none() {
        warn!("no Tokio runtime; automatic load left pending");
    }
    handle
}

impl<T> FeedLoader<T> {
    /// Copy of the current state.
    pub fn snapshot(&self) -> FeedSnapshot<T>
    where
        T: Clone,
    {
        let state = self.shared.lock();
        FeedSnapshot {
            items: state.items.clone(),
            cursor: state.cursor.clone(),
            has_next: state.has_next,
            is_loading: state.in_flight.is_some(),
            error: state.error.clone(),
            epoch: state.epoch,
        }
    }

    /// Borrow the loaded items without cloning them.
    ///
    /// The loader is locked while `f` runs; `f` must not call back into it.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.shared.lock().items)
    }

    /// Number of loaded items.
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    /// Whether no items are loaded.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().items.is_empty()
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.shared.lock().in_flight.is_some()
    }

    /// Whether another page may be requested.
    pub fn has_next(&self) -> bool {
        self.shared.lock().has_next
    }

    /// Message of the last failed fetch.
    pub fn error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }

    /// Cursor the next fetch will send.
    pub fn cursor(&self) -> Option<String> {
        self.shared.lock().cursor.clone()
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.shared.lock().epoch
    }

    /// Watch for state changes.
    ///
    /// The received value is a revision number that advances whenever items,
    /// cursor, loading flag or error change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}
