use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use crate::feed::{FeedError, GameSource};
use crate::model::game::GamesResponse;

/// How long a cached payload is served without consulting the feed.
pub const FRESHNESS_WINDOW_SECS: i64 = 30;

/// Where a returned payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Fresh,
    Cached,
    StaleOnError,
}

impl ServedFrom {
    pub fn as_str(self) -> &'static str {
        match self {
            ServedFrom::Fresh => "fresh",
            ServedFrom::Cached => "cached",
            ServedFrom::StaleOnError => "stale-on-error",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    payload: GamesResponse,
    fetched_at: DateTime<Utc>,
}

/// Fetch-cache-serve facade over a `GameSource`. Holds the single cached
/// payload and the timestamp of its last successful fetch; constructed once
/// at startup and shared by the request handlers.
pub struct ScoreCache {
    source: Box<dyn GameSource>,
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl ScoreCache {
    pub fn new(source: Box<dyn GameSource>) -> Self {
        Self::with_ttl(source, Duration::seconds(FRESHNESS_WINDOW_SECS))
    }

    pub fn with_ttl(source: Box<dyn GameSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Serve games, preferring the cache inside the freshness window.
    ///
    /// On a fetch failure any cached payload is served regardless of age;
    /// the caller only sees an error when no fetch has ever succeeded.
    pub fn get_games(&self, force_refresh: bool) -> Result<(GamesResponse, ServedFrom), FeedError> {
        self.get_games_at(force_refresh, Utc::now())
    }

    /// Same as `get_games` but with an explicit current time, so freshness
    /// decisions can be tested against a fixed clock.
    pub fn get_games_at(
        &self,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<(GamesResponse, ServedFrom), FeedError> {
        if !force_refresh {
            let entry = self.lock_entry();
            if let Some(cached) = entry.as_ref() {
                let age = now - cached.fetched_at;
                if age < self.ttl {
                    info!(age_secs = age.num_seconds(), "Serving cached games");
                    return Ok((cached.payload.clone(), ServedFrom::Cached));
                }
            }
        }

        // Fetch outside the lock. Concurrent requests may each get here and
        // fetch; last successful write wins.
        match self.source.fetch_games() {
            Ok(payload) => {
                info!(games = payload.data.len(), "Fetched fresh games payload");
                let mut entry = self.lock_entry();
                *entry = Some(Entry {
                    payload: payload.clone(),
                    fetched_at: now,
                });
                Ok((payload, ServedFrom::Fresh))
            }
            Err(e) => {
                let entry = self.lock_entry();
                if let Some(cached) = entry.as_ref() {
                    // No age ceiling: arbitrarily stale beats an error.
                    warn!(error = %e, "Feed fetch failed; serving stale cache");
                    Ok((cached.payload.clone(), ServedFrom::StaleOnError))
                } else {
                    error!(error = %e, "Feed fetch failed with nothing cached");
                    Err(e)
                }
            }
        }
    }

    fn lock_entry(&self) -> std::sync::MutexGuard<'_, Option<Entry>> {
        // A poisoned lock still holds a complete entry; recover it.
        self.entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
