// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Wire field names in docs
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // Panics documented in prose where relevant
#![allow(clippy::module_name_repetitions)] // FeedLoader in loader, etc.
#![allow(clippy::must_use_candidate)] // Accessors don't need must_use
#![allow(clippy::significant_drop_tightening)] // Guards are scoped explicitly

//! # dishly-feed - Incremental Cursor-Paginated List Loading
//!
//! Keeps the list behind an infinite-scroll view in sync with a paged data
//! source addressed by opaque cursors.
//!
//! - [`FeedLoader`] appends pages on demand, deduplicating items by id.
//! - Overlapping `load_more` calls collapse into a single fetch.
//! - [`FeedLoader::reset`] invalidates outstanding fetches, so a slow response
//!   for an old search can never leak into the new one.
//! - Failures are stored as state, never raised, and retry with the same cursor.
//!
//! ## Quick Start
//!
//! ```
//! use dishly_feed::{FeedLoader, ItemKey, Keyed, KeysetSource};
//!
//! #[derive(Debug, Clone)]
//! struct Recipe {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Keyed for Recipe {
//!     fn item_key(&self) -> Option<ItemKey> {
//!         Some(ItemKey::Int(self.id))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let recipes = (1..=5)
//!     .map(|id| Recipe { id, name: format!("recipe {id}") })
//!     .collect();
//! let loader = FeedLoader::keyed(KeysetSource::new(recipes, |r: &Recipe| r.id, 2));
//!
//! // first page loads automatically
//! if let Some(first) = loader.start() {
//!     first.await.ok();
//! }
//! assert_eq!(loader.len(), 2);
//!
//! // "load more" button
//! loader.load_more().await;
//! assert_eq!(loader.len(), 4);
//!
//! // filters changed: start over
//! if let Some(reload) = loader.reset() {
//!     reload.await.ok();
//! }
//! assert_eq!(loader.len(), 2);
//! # }
//! ```
//!
//! ## Page Wire Format
//!
//! [`Page`] (de)serializes as `{"items":[..],"nextCursor":"..","hasNext":true}`.
//! A page claiming `hasNext` without a cursor is treated as the last page.

mod identity;
mod loader;
mod memory;
mod page;
mod source;

pub use identity::{ItemKey, KeyFn, Keyed, append_deduped, keyed, unkeyed};
pub use loader::{FeedLoader, FeedSnapshot, LoadOutcome};
pub use memory::{INVALID_CURSOR, KeysetSource};
pub use page::{DEFAULT_PAGE_LIMIT, Page};
pub use source::{DEFAULT_FETCH_ERROR, FetchError, FnSource, PageSource, source_fn};

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
