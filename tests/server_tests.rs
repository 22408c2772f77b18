use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use scoreboard_proxy::cache::ScoreCache;
use scoreboard_proxy::feed::{FeedError, GameSource};
use scoreboard_proxy::model::game::{Game, GamesResponse};
use scoreboard_proxy::server::{AppState, SOURCE_HEADER, router};

struct ScriptedSource {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<GamesResponse, FeedError>>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<GamesResponse, FeedError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GameSource for ScriptedSource {
    fn fetch_games(&self) -> Result<GamesResponse, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FeedError::Unreachable("script exhausted".to_string())))
    }
}

// Lets a test keep a handle on the source after handing it to the router.
struct SharedSource(Arc<ScriptedSource>);

impl GameSource for SharedSource {
    fn fetch_games(&self) -> Result<GamesResponse, FeedError> {
        self.0.fetch_games()
    }
}

fn sample_payload() -> GamesResponse {
    GamesResponse {
        data: vec![Game {
            date: "2024-09-01".to_string(),
            away: "Borah".to_string(),
            a_score: Some(7),
            home: "Capital".to_string(),
            h_score: Some(14),
            time: "Final".to_string(),
            details: String::new(),
        }],
    }
}

fn app(source: Arc<ScriptedSource>) -> Router {
    let cache = Arc::new(ScoreCache::new(Box::new(SharedSource(source))));
    router(AppState { cache })
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn serves_games_document() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_payload())]));
    let app = app(source);

    let response = get(&app, "/api/games").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SOURCE_HEADER], "fresh");

    let body = body_json(response).await;
    assert_eq!(body["data"][0]["Away"], "Borah");
    assert_eq!(body["data"][0]["AScore"], 7);
    assert_eq!(body["data"][0]["Home"], "Capital");
    assert_eq!(body["data"][0]["HScore"], 14);
    assert_eq!(body["data"][0]["Time"], "Final");
}

#[tokio::test]
async fn second_request_within_window_is_served_from_cache() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_payload())]));
    let app = app(source.clone());

    let first = get(&app, "/api/games").await;
    assert_eq!(first.headers()[SOURCE_HEADER], "fresh");

    let second = get(&app, "/api/games?refresh=false").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()[SOURCE_HEADER], "cached");
    assert_eq!(source.calls(), 1);

    let body = body_json(second).await;
    assert_eq!(body["data"][0]["Home"], "Capital");
}

#[tokio::test]
async fn refresh_query_forces_a_fetch() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(sample_payload()),
        Ok(sample_payload()),
    ]));
    let app = app(source.clone());

    get(&app, "/api/games").await;
    let refreshed = get(&app, "/api/games?refresh=true").await;
    assert_eq!(refreshed.status(), StatusCode::OK);
    assert_eq!(refreshed.headers()[SOURCE_HEADER], "fresh");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failed_fetch_with_cache_serves_stale_payload() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(sample_payload()),
        Err(FeedError::Status(500)),
    ]));
    let app = app(source);

    get(&app, "/api/games").await;
    let response = get(&app, "/api/games?refresh=true").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SOURCE_HEADER], "stale-on-error");

    let body = body_json(response).await;
    assert_eq!(body["data"][0]["Away"], "Borah");
}

#[tokio::test]
async fn failed_fetch_with_empty_cache_returns_500_body() {
    let source = Arc::new(ScriptedSource::new(vec![Err(FeedError::Unreachable(
        "connection refused".to_string(),
    ))]));
    let app = app(source);

    let response = get(&app, "/api/games").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Failed to fetch games data");
    assert!(
        body["error"].as_str().unwrap().contains("connection refused"),
        "error body was: {}",
        body
    );
}
