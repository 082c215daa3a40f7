//! Error types for the Quotesync engine.

use thiserror::Error;

/// All possible errors from the Quotesync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("index {index} out of bounds for collection of {len} quotes")]
    IndexOutOfBounds { index: usize, len: usize },

    // Format errors
    #[error("invalid import: {0}")]
    ImportFormat(String),

    #[error("unreadable stored collection: {0}")]
    StorageParse(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error was caused by rejected user input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyField { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
