//! String-keyed blob stores backing persistence.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a blob store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}

/// A flat key-value store of string blobs.
///
/// Calls are synchronous and made while the widget state is locked, so
/// implementations must return quickly. Blobs are small (a few kilobytes).
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
