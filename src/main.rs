use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use scoreboard_proxy::cache::ScoreCache;
use scoreboard_proxy::config::Config;
use scoreboard_proxy::feed::HttpFeed;
use scoreboard_proxy::server::{self, AppState};

#[tokio::main]
async fn main() {
    // Initialize structured logging with tracing
    let _ = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_current_span(false)
        .with_target(false)
        .with_ansi(false)
        .try_init();

    let config = Config::from_env();
    let cache = Arc::new(ScoreCache::new(Box::new(HttpFeed::new(
        config.feed_url.clone(),
    ))));
    let app = server::router(AppState { cache });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "Scoreboard proxy listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
