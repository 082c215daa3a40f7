//! Unified error handling for the client.

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Engine(#[from] quotesync_engine::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Whether the remote endpoint could not be used.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::HttpStatus { .. })
    }

    /// Whether user input was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Engine(e) if e.is_validation())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
