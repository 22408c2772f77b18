use std::env;

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment once at startup.
    pub fn from_env() -> Self {
        let feed_url = env::var("FEED_URL").expect("FEED_URL must be set");
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        Self { feed_url, port }
    }
}
