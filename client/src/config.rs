//! Configuration management for the client.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Public mock REST endpoint the widget interoperates with by default.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote endpoint for fetching and posting quotes
    pub remote_url: String,
    /// Period of the background sync
    pub sync_interval: Duration,
    /// Maximum number of remote items taken per fetch
    pub fetch_limit: usize,
    /// Timeout applied to every remote request
    pub http_timeout: Duration,
    /// Directory of the durable blob store
    pub data_dir: PathBuf,
    /// `userId` attached to posted quotes
    pub user_id: i64,
    /// Run one sync right after startup
    pub sync_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            sync_interval: Duration::from_secs(30),
            fetch_limit: 5,
            http_timeout: Duration::from_secs(10),
            data_dir: PathBuf::from("./data"),
            user_id: 1,
            sync_on_start: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let remote_url = env::var("QUOTESYNC_REMOTE_URL").unwrap_or(defaults.remote_url);

        let interval_secs: u64 = parse_var(
            "QUOTESYNC_SYNC_INTERVAL_SECS",
            defaults.sync_interval.as_secs(),
        )?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "QUOTESYNC_SYNC_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let fetch_limit = parse_var("QUOTESYNC_FETCH_LIMIT", defaults.fetch_limit)?;
        let timeout_secs: u64 = parse_var(
            "QUOTESYNC_HTTP_TIMEOUT_SECS",
            defaults.http_timeout.as_secs(),
        )?;
        let user_id = parse_var("QUOTESYNC_USER_ID", defaults.user_id)?;

        let data_dir = env::var("QUOTESYNC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let sync_on_start = env::var("QUOTESYNC_SYNC_ON_START")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(defaults.sync_on_start);

        Ok(Self {
            remote_url,
            sync_interval: Duration::from_secs(interval_secs),
            fetch_limit,
            http_timeout: Duration::from_secs(timeout_secs),
            data_dir,
            user_id,
            sync_on_start,
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}
