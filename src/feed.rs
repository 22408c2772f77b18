use thiserror::Error;
use tracing::{error, info_span, warn};

use crate::model::game::GamesResponse;
use crate::parse;

/// Everything that can go wrong between us and the feed. The cache facade
/// treats all of these the same way (fall back to stale data if it has any);
/// the distinction survives into logs and the 500 body.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Unreachable(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("unparsable games payload: {0}")]
    Malformed(String),
}

/// Source of game data. `HttpFeed` is the real one; tests inject scripted
/// implementations so nothing touches the network.
pub trait GameSource: Send + Sync {
    fn fetch_games(&self) -> Result<GamesResponse, FeedError>;
}

/// Blocking HTTP fetcher for the configured feed URL.
#[derive(Debug)]
pub struct HttpFeed {
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl GameSource for HttpFeed {
    fn fetch_games(&self) -> Result<GamesResponse, FeedError> {
        let response_result = {
            let _span = info_span!("feed_fetch", url = %self.url).entered();
            ureq::get(&self.url).call()
        };
        match response_result {
            Ok(response) => {
                let status = response.status().as_u16();
                let mut body_reader = response.into_body();
                let body = body_reader.read_to_string().map_err(|e| {
                    error!(error = %e, "Failed to read feed response body");
                    FeedError::Body(e.to_string())
                })?;
                // ureq surfaces most non-2xx codes as Err, but keep the
                // explicit check for clients configured otherwise.
                if !(200..300).contains(&status) {
                    warn!(status, "Feed returned non-success status");
                    return Err(FeedError::Status(status));
                }
                parse::parse_games(&body)
            }
            Err(ureq::Error::StatusCode(code)) => {
                warn!(status = code, url = %self.url, "Feed returned non-success status");
                Err(FeedError::Status(code))
            }
            Err(e) => {
                error!(error = %e, url = %self.url, "Feed request failed");
                Err(FeedError::Unreachable(e.to_string()))
            }
        }
    }
}
