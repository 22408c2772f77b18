use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::cache::ScoreCache;

pub const SOURCE_HEADER: &str = "x-games-source";

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ScoreCache>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", get(get_games))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct GamesQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[instrument(skip(state))]
async fn get_games(State(state): State<AppState>, Query(query): Query<GamesQuery>) -> Response {
    let cache = state.cache.clone();
    // The feed client is blocking; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || cache.get_games(query.refresh)).await;
    match result {
        Ok(Ok((payload, served_from))) => {
            info!(source = served_from.as_str(), games = payload.data.len(), "Serving games");
            ([(SOURCE_HEADER, served_from.as_str())], Json(payload)).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to fetch games with nothing cached");
            error_response(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Games fetch task failed");
            error_response(e.to_string())
        }
    }
}

fn error_response(detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "message": "Failed to fetch games data",
            "error": detail,
        })),
    )
        .into_response()
}
