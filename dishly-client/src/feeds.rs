//! Typed cursor feeds over the Dishly API.
//!
//! Every list screen of the app is backed by one cursor endpoint. A
//! [`FeedRoute`] names the endpoint, an [`ApiFeed`] turns it into a
//! [`PageSource`], and [`DishlyApi`] hands out ready-to-use [`FeedLoader`]s.
//!
//! All cursor endpoints share one contract:
//!
//! ```text
//! GET /api/<feed>/cursor?limit=10&cursor=<last id>
//! 200 {"items":[..],"nextCursor":"123","hasNext":true}
//! ```
//!
//! Items come newest first; the cursor is the id of the last item of the
//! previous page and is only sent once there is one.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use dishly_feed::{FeedLoader, FetchError, Keyed, Page, PageSource};

use crate::config::{ClientConfig, ConfigError};
use crate::constants::{QUERY_CURSOR, QUERY_LIMIT};
use crate::http_client::{ClientError, ClientRequest};
use crate::models::{MealPrep, MealPrepSummary, Recipe, RecipeSummary};
use crate::session::{Anonymous, SessionProvider};
use crate::transport::Transport;

// ============================================================================
// Search filters
// ============================================================================

/// Filters of the recipe and meal prep search feeds.
///
/// Text filters are sent only when non-blank, flags only when set.
///
/// ```
/// use dishly_client::SearchFilters;
///
/// let filters = SearchFilters::default()
///     .name("curry")
///     .author("  ")
///     .only_following(true);
///
/// assert_eq!(
///     filters.query_pairs(),
///     vec![("name", "curry".to_string()), ("onlyFollowing", "true".to_string())]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct SearchFilters {
    /// Substring of the title.
    pub name: Option<String>,
    /// Name of an ingredient the item must contain.
    pub ingredient: Option<String>,
    /// Author's username.
    pub author: Option<String>,
    /// Only items by users the viewer follows. Needs a session.
    pub only_following: bool,
    /// Hide items containing the viewer's undesired ingredients. Needs a session.
    pub exclude_undesired: bool,
}

impl SearchFilters {
    /// Filter by title.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by ingredient.
    #[must_use]
    pub fn ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredient = Some(ingredient.into());
        self
    }

    /// Filter by author.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Restrict to followed authors.
    #[must_use]
    pub const fn only_following(mut self, on: bool) -> Self {
        self.only_following = on;
        self
    }

    /// Hide undesired ingredients.
    #[must_use]
    pub const fn exclude_undesired(mut self, on: bool) -> Self {
        self.exclude_undesired = on;
        self
    }

    /// Whether no filter would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query parameters these filters add, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("name", &self.name),
            ("ingredient", &self.ingredient),
            ("author", &self.author),
        ];
        let flags = [
            ("onlyFollowing", self.only_following),
            ("excludeUndesired", self.exclude_undesired),
        ];

        text.into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key, v.to_string()))
            })
            .chain(
                flags
                    .into_iter()
                    .filter(|(_, on)| *on)
                    .map(|(key, _)| (key, "true".to_string())),
            )
            .collect()
    }
}

// ============================================================================
// Routes
// ============================================================================

/// A cursor endpoint of the API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedRoute {
    /// Home feed of recipes.
    Recipes,
    /// Home feed of meal preps.
    MealPreps,
    /// Recipe search.
    SearchRecipes(SearchFilters),
    /// Meal prep search.
    SearchMealPreps(SearchFilters),
    /// Public recipes of a user's profile.
    UserRecipes {
        /// Profile owner.
        user_id: i64,
    },
    /// Public meal preps of a user's profile.
    UserMealPreps {
        /// Profile owner.
        user_id: i64,
    },
    /// The viewer's favorite recipes.
    FavoriteRecipes,
    /// The viewer's favorite meal preps.
    FavoriteMealPreps,
    /// Recipes saved in one of the viewer's collections.
    CollectionRecipes {
        /// Collection id.
        collection_id: i64,
    },
    /// Meal preps saved in one of the viewer's collections.
    CollectionMealPreps {
        /// Collection id.
        collection_id: i64,
    },
}

impl FeedRoute {
    /// Endpoint path, relative to the base URL.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Recipes => "/api/recipes/cursor".to_string(),
            Self::MealPreps => "/api/mealpreps/cursor".to_string(),
            Self::SearchRecipes(_) => "/api/recipes/search/cursor".to_string(),
            Self::SearchMealPreps(_) => "/api/mealpreps/search/cursor".to_string(),
            Self::UserRecipes { user_id } => format!("/api/users/{user_id}/public/recipes/cursor"),
            Self::UserMealPreps { user_id } => {
                format!("/api/users/{user_id}/public/mealpreps/cursor")
            },
            Self::FavoriteRecipes => "/api/favorites/recipes/cursor".to_string(),
            Self::FavoriteMealPreps => "/api/favorites/mealpreps/cursor".to_string(),
            Self::CollectionRecipes { collection_id } => {
                format!("/api/collections/{collection_id}/recipes/cursor")
            },
            Self::CollectionMealPreps { collection_id } => {
                format!("/api/collections/{collection_id}/mealpreps/cursor")
            },
        }
    }

    /// Message shown to the user when the server rejects a page request.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Recipes => "could not load recipes",
            Self::MealPreps => "could not load meal preps",
            Self::SearchRecipes(_) => "could not search recipes",
            Self::SearchMealPreps(_) => "could not search meal preps",
            Self::UserRecipes { .. } => "could not load public recipes",
            Self::UserMealPreps { .. } => "could not load public meal preps",
            Self::FavoriteRecipes => "could not load favorite recipes",
            Self::FavoriteMealPreps => "could not load favorite meal preps",
            Self::CollectionRecipes { .. } => "could not load collection recipes",
            Self::CollectionMealPreps { .. } => "could not load collection meal preps",
        }
    }

    /// Whether the endpoint only answers for a signed-in user.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        match self {
            Self::FavoriteRecipes
            | Self::FavoriteMealPreps
            | Self::CollectionRecipes { .. }
            | Self::CollectionMealPreps { .. } => true,
            Self::SearchRecipes(filters) | Self::SearchMealPreps(filters) => {
                filters.only_following || filters.exclude_undesired
            },
            Self::Recipes | Self::MealPreps | Self::UserRecipes { .. } | Self::UserMealPreps { .. } => {
                false
            },
        }
    }

    /// Search filters, for the search routes.
    #[must_use]
    pub const fn filters(&self) -> Option<&SearchFilters> {
        match self {
            Self::SearchRecipes(filters) | Self::SearchMealPreps(filters) => Some(filters),
            _ => None,
        }
    }
}

impl fmt::Display for FeedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ============================================================================
// ApiFeed
// ============================================================================

/// [`PageSource`] for one [`FeedRoute`].
///
/// A non-2xx answer fails the fetch with the route's
/// [`failure_message`](FeedRoute::failure_message); transport and decode
/// failures fail with their own description. `204 No Content` is an empty
/// last page.
pub struct ApiFeed<T> {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    base: Url,
    route: FeedRoute,
    limit: usize,
    timeout_ms: u64,
    _item: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ApiFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiFeed")
            .field("base", &self.base.as_str())
            .field("route", &self.route)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for ApiFeed<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
            base: self.base.clone(),
            route: self.route.clone(),
            limit: self.limit,
            timeout_ms: self.timeout_ms,
            _item: PhantomData,
        }
    }
}

impl<T> ApiFeed<T> {
    /// The endpoint this feed reads.
    pub const fn route(&self) -> &FeedRoute {
        &self.route
    }

    /// Items requested per page.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Build the request for the page after `cursor`.
    pub fn request(&self, cursor: Option<&str>) -> Result<ClientRequest, ClientError> {
        let cursor = cursor.map(str::trim).filter(|c| !c.is_empty());
        let mut request = ClientRequest::get(&self.base, &self.route.path())?
            .query(QUERY_LIMIT, self.limit)
            .query_opt(QUERY_CURSOR, cursor);
        if let Some(filters) = self.route.filters() {
            for (key, value) in filters.query_pairs() {
                request = request.query(key, value);
            }
        }
        Ok(request
            .bearer(self.session.token().as_deref())
            .timeout_ms(self.timeout_ms))
    }
}

#[async_trait]
impl<T> PageSource<T> for ApiFeed<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>, FetchError> {
        let request = self
            .request(cursor)
            .map_err(|e| FetchError::new(e.to_string()))?;

        let response = match request.send_with(&*self.transport).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    route = %self.route,
                    error = %err,
                    retryable = err.is_retryable(),
                    "page request failed"
                );
                return Err(FetchError::new(err.to_string()));
            },
        };

        if response.is_no_content() {
            debug!(route = %self.route, "no content");
            return Ok(Page::empty());
        }
        let response = response.error_for_status().map_err(|err| {
            warn!(
                route = %self.route,
                status = err.status().unwrap_or_default(),
                retryable = err.is_retryable(),
                error = %err,
                "page request rejected"
            );
            FetchError::new(self.route.failure_message())
        })?;

        response.json::<Page<T>>().map_err(|err| {
            warn!(route = %self.route, error = %err, "malformed page");
            FetchError::new(err.to_string())
        })
    }
}

// ============================================================================
// DishlyApi
// ============================================================================

/// Errors raised while setting up a [`DishlyApi`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SetupError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be created.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Entry point: hands out feeds and loaders for every list of the app.
///
/// ```no_run
/// use dishly_client::{ClientConfig, DishlyApi, SearchFilters, StaticToken};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let api = DishlyApi::connect(&ClientConfig::default())?
///     .with_session(StaticToken::new("token"));
///
/// let results = api.search_recipes(SearchFilters::default().ingredient("tofu"));
/// if let Some(first) = results.start() {
///     first.await?;
/// }
/// for recipe in results.snapshot().items {
///     println!("{}", recipe.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DishlyApi {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    base: Url,
    page_limit: usize,
    timeout_ms: u64,
}

impl fmt::Debug for DishlyApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DishlyApi")
            .field("base", &self.base.as_str())
            .field("page_limit", &self.page_limit)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl DishlyApi {
    /// Create an API handle that sends through `transport`.
    pub fn new(config: &ClientConfig, transport: impl Transport + 'static) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: Arc::new(transport),
            session: Arc::new(Anonymous),
            base: config.base()?,
            page_limit: config.page_limit,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Create an API handle backed by `reqwest`.
    #[cfg(feature = "reqwest")]
    pub fn connect(config: &ClientConfig) -> Result<Self, SetupError> {
        let transport = crate::transport::ReqwestTransport::new(config.timeout_ms)?;
        Self::new(config, transport).map_err(SetupError::from)
    }

    /// Attach a session; feeds created afterwards send its token.
    #[must_use]
    pub fn with_session(mut self, session: impl SessionProvider + 'static) -> Self {
        self.session = Arc::new(session);
        self
    }

    /// Override the page size. Zero keeps the current size.
    #[must_use]
    pub const fn with_page_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.page_limit = limit;
        }
        self
    }

    /// Base URL requests are sent to.
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Page source for `route`.
    pub fn feed<T>(&self, route: FeedRoute) -> ApiFeed<T> {
        ApiFeed {
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
            base: self.base.clone(),
            route,
            limit: self.page_limit,
            timeout_ms: self.timeout_ms,
            _item: PhantomData,
        }
    }

    /// Loader for `route`, deduplicating items by id.
    pub fn loader<T>(&self, route: FeedRoute) -> FeedLoader<T>
    where
        T: Keyed + DeserializeOwned + Send + 'static,
    {
        FeedLoader::keyed(self.feed(route))
    }

    /// Home feed of recipes.
    pub fn recipes(&self) -> FeedLoader<Recipe> {
        self.loader(FeedRoute::Recipes)
    }

    /// Home feed of meal preps.
    pub fn meal_preps(&self) -> FeedLoader<MealPrep> {
        self.loader(FeedRoute::MealPreps)
    }

    /// Recipe search results.
    pub fn search_recipes(&self, filters: SearchFilters) -> FeedLoader<Recipe> {
        self.loader(FeedRoute::SearchRecipes(filters))
    }

    /// Meal prep search results.
    pub fn search_meal_preps(&self, filters: SearchFilters) -> FeedLoader<MealPrep> {
        self.loader(FeedRoute::SearchMealPreps(filters))
    }

    /// Public recipes on a profile.
    pub fn user_recipes(&self, user_id: i64) -> FeedLoader<Recipe> {
        self.loader(FeedRoute::UserRecipes { user_id })
    }

    /// Public meal preps on a profile.
    pub fn user_meal_preps(&self, user_id: i64) -> FeedLoader<MealPrep> {
        self.loader(FeedRoute::UserMealPreps { user_id })
    }

    /// The viewer's favorite recipes.
    pub fn favorite_recipes(&self) -> FeedLoader<Recipe> {
        self.loader(FeedRoute::FavoriteRecipes)
    }

    /// The viewer's favorite meal preps.
    pub fn favorite_meal_preps(&self) -> FeedLoader<MealPrep> {
        self.loader(FeedRoute::FavoriteMealPreps)
    }

    /// Recipes in a collection.
    pub fn collection_recipes(&self, collection_id: i64) -> FeedLoader<RecipeSummary> {
        self.loader(FeedRoute::CollectionRecipes { collection_id })
    }

    /// Meal preps in a collection.
    pub fn collection_meal_preps(&self, collection_id: i64) -> FeedLoader<MealPrepSummary> {
        self.loader(FeedRoute::CollectionMealPreps { collection_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(FeedRoute::Recipes.path(), "/api/recipes/cursor");
        assert_eq!(
            FeedRoute::SearchMealPreps(SearchFilters::default()).path(),
            "/api/mealpreps/search/cursor"
        );
        assert_eq!(
            FeedRoute::UserRecipes { user_id: 7 }.path(),
            "/api/users/7/public/recipes/cursor"
        );
        assert_eq!(
            FeedRoute::CollectionMealPreps { collection_id: 3 }.path(),
            "/api/collections/3/mealpreps/cursor"
        );
        assert_eq!(FeedRoute::FavoriteRecipes.path(), "/api/favorites/recipes/cursor");
    }

    #[test]
    fn test_session_requirements() {
        assert!(FeedRoute::FavoriteMealPreps.requires_session());
        assert!(!FeedRoute::UserMealPreps { user_id: 1 }.requires_session());
        assert!(!FeedRoute::SearchRecipes(SearchFilters::default().name("x")).requires_session());
        assert!(
            FeedRoute::SearchRecipes(SearchFilters::default().exclude_undesired(true))
                .requires_session()
        );
    }

    #[test]
    fn test_filters_order_and_blanks() {
        let filters = SearchFilters::default()
            .author("li")
            .name("")
            .ingredient(" rice ")
            .exclude_undesired(true);
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("ingredient", "rice".to_string()),
                ("author", "li".to_string()),
                ("excludeUndesired", "true".to_string()),
            ]
        );
        assert!(SearchFilters::default().name("  ").is_empty());
    }
}
