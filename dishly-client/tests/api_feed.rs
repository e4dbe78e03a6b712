//! Feeds against a recording in-process transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dishly_client::{
    ClientConfig, ClientError, ClientRequest, DishlyApi, FeedRoute, Recipe, RecipeSummary,
    Response, SearchFilters, SharedSession, Transport,
};
use dishly_feed::{FetchError, LoadOutcome, PageSource};

/// Replays canned responses and records every request URL.
#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<ClientRequest>>>,
    replies: Arc<Mutex<VecDeque<Result<Response, ClientError>>>>,
}

impl Recorder {
    fn reply(&self, reply: Result<Response, ClientError>) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn json(&self, status: u16, body: &str) -> &Self {
        self.reply(Ok(Response::json_body(status, body)))
    }

    fn urls(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|req| req.url().to_string())
            .collect()
    }

    fn last(&self) -> ClientRequest {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, request: &ClientRequest) -> Result<Response, ClientError> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Connection("no canned reply".into())))
    }
}

fn api(recorder: &Recorder) -> DishlyApi {
    let config = ClientConfig::new("http://api.test").with_env(&[]).unwrap();
    DishlyApi::new(&config, recorder.clone()).unwrap()
}

fn recipe_page(ids: &[i64], next: Option<&str>, has_next: bool) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| format!(r#"{{"id":{id},"name":"recipe {id}"}}"#))
        .collect();
    let next = next.map_or_else(|| "null".to_string(), |c| format!("\"{c}\""));
    format!(
        r#"{{"items":[{}],"nextCursor":{next},"hasNext":{has_next}}}"#,
        items.join(",")
    )
}

#[tokio::test]
async fn home_feed_walks_pages_with_cursor() {
    let recorder = Recorder::default();
    recorder
        .json(200, &recipe_page(&[30, 29], Some("29"), true))
        .json(200, &recipe_page(&[28], None, false));

    let feed = api(&recorder).recipes();
    feed.start().unwrap().await.unwrap();
    assert_eq!(feed.load_more().await, LoadOutcome::Appended { added: 1 });
    assert_eq!(feed.load_more().await, LoadOutcome::Exhausted);

    let names: Vec<String> = feed.snapshot().items.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["recipe 30", "recipe 29", "recipe 28"]);
    assert_eq!(
        recorder.urls(),
        vec![
            "http://api.test/api/recipes/cursor?limit=10",
            "http://api.test/api/recipes/cursor?limit=10&cursor=29",
        ]
    );
}

#[tokio::test]
async fn overlapping_pages_are_deduplicated() {
    let recorder = Recorder::default();
    recorder
        .json(200, &recipe_page(&[5, 4], Some("4"), true))
        .json(200, &recipe_page(&[4, 3], Some("3"), true));

    let feed = api(&recorder).user_recipes(9);
    feed.load_more().await;
    feed.load_more().await;

    let ids: Vec<i64> = feed.snapshot().items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![5, 4, 3]);
    assert!(recorder.urls()[0].starts_with("http://api.test/api/users/9/public/recipes/cursor?"));
}

#[tokio::test]
async fn search_sends_only_set_filters() {
    let recorder = Recorder::default();
    recorder.json(200, &recipe_page(&[], None, false));

    let filters = SearchFilters::default()
        .ingredient("chickpea")
        .author("")
        .exclude_undesired(true);
    api(&recorder).search_recipes(filters).load_more().await;

    assert_eq!(
        recorder.urls(),
        vec!["http://api.test/api/recipes/search/cursor?limit=10&ingredient=chickpea&excludeUndesired=true"]
    );
}

#[tokio::test]
async fn server_rejection_uses_route_message() {
    let recorder = Recorder::default();
    recorder
        .json(500, r#"{"error":"boom"}"#)
        .json(200, &recipe_page(&[1], None, false));

    let feed = api(&recorder).user_recipes(3);
    let outcome = feed.load_more().await;
    assert_eq!(
        outcome,
        LoadOutcome::Failed(FetchError::new("could not load public recipes"))
    );
    assert_eq!(feed.error().as_deref(), Some("could not load public recipes"));
    assert!(feed.is_empty());
    assert!(feed.has_next());

    // retry goes to the same place
    feed.load_more().await;
    assert_eq!(feed.error(), None);
    assert_eq!(feed.len(), 1);
    let urls = recorder.urls();
    assert_eq!(urls[0], urls[1]);
}

#[tokio::test]
async fn oversized_error_page_maps_to_route_message() {
    let recorder = Recorder::default();
    recorder.reply(Ok(Response::new(404, vec![], "<p>gone</p>".repeat(500).into_bytes())));

    let feed = api(&recorder).favorite_meal_preps();
    let outcome = feed.load_more().await;
    assert_eq!(
        outcome,
        LoadOutcome::Failed(FetchError::new(FeedRoute::FavoriteMealPreps.failure_message()))
    );
    assert!(feed.has_next());
    assert_eq!(feed.cursor(), None);
}

#[tokio::test]
async fn transport_failure_keeps_its_own_message() {
    let recorder = Recorder::default();
    recorder.reply(Err(ClientError::Timeout { timeout_ms: Some(30_000) }));

    let feed = api(&recorder).recipes();
    feed.load_more().await;
    assert_eq!(
        feed.error().as_deref(),
        Some("request timed out after 30000ms")
    );
}

#[tokio::test]
async fn malformed_body_fails_the_fetch() {
    let recorder = Recorder::default();
    recorder.json(200, "<html>");

    let source = api(&recorder).feed::<Recipe>(FeedRoute::Recipes);
    let err = source.fetch_page(None).await.unwrap_err();
    assert!(err.message().starts_with("failed to decode response"));
}

#[tokio::test]
async fn no_content_is_an_empty_last_page() {
    let recorder = Recorder::default();
    recorder.reply(Ok(Response::new(204, vec![], vec![])));

    let feed = api(&recorder).collection_recipes(4);
    assert_eq!(feed.load_more().await, LoadOutcome::Appended { added: 0 });
    assert!(!feed.has_next());
    assert!(recorder.urls()[0].starts_with("http://api.test/api/collections/4/recipes/cursor"));
}

#[tokio::test]
async fn session_token_is_read_per_request() {
    let recorder = Recorder::default();
    recorder
        .json(200, &recipe_page(&[2], Some("2"), true))
        .json(200, &recipe_page(&[1], None, false));

    let session = SharedSession::default();
    let feed = api(&recorder).with_session(session.clone()).favorite_recipes();

    feed.load_more().await;
    assert_eq!(recorder.last().header_value("authorization"), None);

    session.sign_in("abc");
    feed.load_more().await;
    assert_eq!(recorder.last().header_value("authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn collection_summaries_decode() {
    let recorder = Recorder::default();
    recorder.json(
        200,
        r#"{"items":[{"id":8,"name":"Pho","image":"pho.jpg"}],"nextCursor":null,"hasNext":false}"#,
    );

    let source = api(&recorder).feed::<RecipeSummary>(FeedRoute::CollectionRecipes { collection_id: 1 });
    let page = source.fetch_page(None).await.unwrap();
    assert_eq!(page.items[0].image.as_deref(), Some("pho.jpg"));
    assert!(page.is_terminal());
}

#[tokio::test]
async fn reset_starts_again_from_first_page() {
    let recorder = Recorder::default();
    recorder
        .json(200, &recipe_page(&[9, 8], Some("8"), true))
        .json(200, &recipe_page(&[9], None, false));

    let feed = api(&recorder).meal_preps();
    feed.load_more().await;
    feed.reset().unwrap().await.unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(
        recorder.urls(),
        vec![
            "http://api.test/api/mealpreps/cursor?limit=10",
            "http://api.test/api/mealpreps/cursor?limit=10",
        ]
    );
}

#[tokio::test]
async fn page_limit_override_is_sent() {
    let recorder = Recorder::default();
    recorder.json(200, &recipe_page(&[], None, false));

    api(&recorder).with_page_limit(3).recipes().load_more().await;
    assert_eq!(recorder.urls(), vec!["http://api.test/api/recipes/cursor?limit=3"]);
}
