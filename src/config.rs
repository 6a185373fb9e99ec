//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use crate::models::InBoundsPolicy;
use crate::services::loader::DataSource;
use crate::services::viewport::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
use std::env;
use std::time::Duration;

const DEFAULT_DATA_SOURCE: &str = "data/features.geojson";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static feature document (path or http(s) URL)
    pub data_source: DataSource,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// In-bounds policy used when a request doesn't name one
    pub visibility_policy: InBoundsPolicy,
    /// Viewport sessions kept before the oldest is evicted
    pub viewport_max_sessions: usize,
    /// Viewport sessions idle this long are swept
    pub viewport_idle_timeout: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            data_source: DataSource::parse("tests/fixtures/features.geojson"),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            port: 8080,
            visibility_policy: InBoundsPolicy::All,
            viewport_max_sessions: DEFAULT_MAX_SESSIONS,
            viewport_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let visibility_policy = match env::var("VISIBILITY_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::Invalid("VISIBILITY_POLICY", e))?,
            Err(_) => InBoundsPolicy::default(),
        };

        let viewport_max_sessions = match env::var("VIEWPORT_MAX_SESSIONS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid("VIEWPORT_MAX_SESSIONS", format!("'{}'", raw))
                })?,
            Err(_) => DEFAULT_MAX_SESSIONS,
        };

        let viewport_idle_timeout = match env::var("VIEWPORT_IDLE_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid("VIEWPORT_IDLE_SECS", e.to_string()))?,
            Err(_) => DEFAULT_IDLE_TIMEOUT,
        };

        Ok(Self {
            data_source: DataSource::parse(
                &env::var("DATA_SOURCE").unwrap_or_else(|_| DEFAULT_DATA_SOURCE.to_string()),
            ),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            visibility_policy,
            viewport_max_sessions,
            viewport_idle_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
