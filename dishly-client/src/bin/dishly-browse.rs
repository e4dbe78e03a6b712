//! Browse a Dishly feed from the terminal.
//!
//! ```bash
//! dishly-browse recipes --pages 3
//! dishly-browse recipes --ingredient tofu --exclude-undesired --token $TOKEN
//! dishly-browse user-meal-preps --id 42 --limit 5
//! RUST_LOG=dishly_feed=debug dishly-browse favorite-recipes
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dishly_client::constants::{ENV_CONFIG_PATH, ENV_TOKEN};
use dishly_client::{
    ClientConfig, DishlyApi, FeedRoute, Headline, MealPrep, MealPrepSummary, Recipe,
    RecipeSummary, SearchFilters, StaticToken,
};
use dishly_feed::{FeedLoader, Keyed, LoadOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Feed {
    Recipes,
    MealPreps,
    UserRecipes,
    UserMealPreps,
    FavoriteRecipes,
    FavoriteMealPreps,
    CollectionRecipes,
    CollectionMealPreps,
}

#[derive(Debug, Parser)]
#[command(name = "dishly-browse", version, about = "Page through a Dishly feed")]
struct Args {
    /// Feed to read.
    #[arg(value_enum)]
    feed: Feed,

    /// User id (user-* feeds) or collection id (collection-* feeds).
    #[arg(long)]
    id: Option<i64>,

    /// Search by title (recipes and meal-preps feeds).
    #[arg(long)]
    name: Option<String>,

    /// Search by ingredient.
    #[arg(long)]
    ingredient: Option<String>,

    /// Search by author.
    #[arg(long)]
    author: Option<String>,

    /// Only authors you follow.
    #[arg(long)]
    only_following: bool,

    /// Hide items with your undesired ingredients.
    #[arg(long)]
    exclude_undesired: bool,

    /// Pages to fetch before stopping.
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Items per page (overrides config).
    #[arg(long)]
    limit: Option<usize>,

    /// TOML config file.
    #[arg(long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Bearer token for signed-in feeds.
    #[arg(long, env = ENV_TOKEN, hide_env_values = true)]
    token: Option<String>,
}

impl Args {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::default()
            .only_following(self.only_following)
            .exclude_undesired(self.exclude_undesired);
        if let Some(name) = &self.name {
            filters = filters.name(name.as_str());
        }
        if let Some(ingredient) = &self.ingredient {
            filters = filters.ingredient(ingredient.as_str());
        }
        if let Some(author) = &self.author {
            filters = filters.author(author.as_str());
        }
        filters
    }

    fn id(&self) -> Result<i64> {
        self.id
            .with_context(|| format!("--id is required for {:?}", self.feed))
    }

    fn route(&self) -> Result<FeedRoute> {
        let filters = self.filters();
        Ok(match self.feed {
            Feed::Recipes if filters.is_empty() => FeedRoute::Recipes,
            Feed::Recipes => FeedRoute::SearchRecipes(filters),
            Feed::MealPreps if filters.is_empty() => FeedRoute::MealPreps,
            Feed::MealPreps => FeedRoute::SearchMealPreps(filters),
            Feed::UserRecipes => FeedRoute::UserRecipes { user_id: self.id()? },
            Feed::UserMealPreps => FeedRoute::UserMealPreps { user_id: self.id()? },
            Feed::FavoriteRecipes => FeedRoute::FavoriteRecipes,
            Feed::FavoriteMealPreps => FeedRoute::FavoriteMealPreps,
            Feed::CollectionRecipes => FeedRoute::CollectionRecipes {
                collection_id: self.id()?,
            },
            Feed::CollectionMealPreps => FeedRoute::CollectionMealPreps {
                collection_id: self.id()?,
            },
        })
    }
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    Ok(config.with_process_env()?)
}

/// Print pages of `loader` until `pages` have been shown or the feed ends.
async fn browse<T>(loader: FeedLoader<T>, pages: usize) -> Result<()>
where
    T: Keyed + Headline + DeserializeOwned + Send + 'static,
{
    let mut printed = 0;
    if let Some(first) = loader.start() {
        report(first.await?)?;
    }

    for page in 1..=pages {
        printed = loader.with_items(|items| {
            for item in items.iter().skip(printed) {
                println!("{}", item.headline());
            }
            items.len()
        });

        if !loader.has_next() {
            info!(total = printed, "end of feed");
            return Ok(());
        }
        if page < pages {
            report(loader.load_more().await)?;
        }
    }
    info!(total = printed, "stopped with more available");
    Ok(())
}

fn report(outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Failed(err) => bail!("{err}"),
        other => {
            tracing::debug!(?other, "load finished");
            Ok(())
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args).context("loading configuration")?;
    let route = args.route()?;

    let mut api = DishlyApi::connect(&config)?.with_page_limit(args.limit.unwrap_or(0));
    match args.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => api = api.with_session(StaticToken::new(token)),
        None if route.requires_session() => {
            warn!(%route, "this feed needs a signed-in user; pass --token or set {ENV_TOKEN}");
        },
        None => {},
    }
    info!(base = %api.base_url(), %route, "browsing");

    let pages = args.pages.max(1);
    match args.feed {
        Feed::Recipes | Feed::UserRecipes | Feed::FavoriteRecipes => {
            browse(api.loader::<Recipe>(route), pages).await
        },
        Feed::MealPreps | Feed::UserMealPreps | Feed::FavoriteMealPreps => {
            browse(api.loader::<MealPrep>(route), pages).await
        },
        Feed::CollectionRecipes => browse(api.loader::<RecipeSummary>(route), pages).await,
        Feed::CollectionMealPreps => browse(api.loader::<MealPrepSummary>(route), pages).await,
    }
}
