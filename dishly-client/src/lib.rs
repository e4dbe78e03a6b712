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
#![allow(clippy::doc_markdown)] // Endpoint paths and JSON keys in docs
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // ClientConfig in config, etc.
#![allow(clippy::must_use_candidate)] // Accessors don't need must_use

//! # dishly-client - Cursor Feeds for the Dishly API
//!
//! Connects [`dishly_feed::FeedLoader`] to the Dishly REST backend: every
//! infinite-scroll list of the app (home feeds, search, profiles, favorites,
//! collections) as a typed, deduplicating loader.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dishly_client::{ClientConfig, DishlyApi};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default().with_process_env()?;
//! let api = DishlyApi::connect(&config)?;
//!
//! let feed = api.recipes();
//! if let Some(first) = feed.start() {
//!     first.await?;
//! }
//! while feed.has_next() && feed.len() < 50 {
//!     feed.load_more().await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - defaults, TOML file and environment overrides
//! - [`http_client`] - request builder, response and error types
//! - [`transport`] - how requests leave the process (`reqwest` by default)
//! - [`session`] - bearer token for signed-in feeds
//! - [`models`] - recipes, meal preps and their summaries
//! - [`feeds`] - endpoints, search filters and loaders

pub mod config;
pub mod constants;
pub mod feeds;
pub mod http_client;
pub mod models;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use feeds::{ApiFeed, DishlyApi, FeedRoute, SearchFilters, SetupError};
pub use http_client::{ClientError, ClientRequest, Response};
pub use models::{Headline, IngredientQuantity, MealPrep, MealPrepReview, MealPrepSummary, Recipe, RecipeSummary};
pub use session::{Anonymous, SessionProvider, SharedSession, StaticToken};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
