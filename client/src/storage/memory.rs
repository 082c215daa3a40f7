//! In-memory blob store, scoped to the lifetime of the process.

use super::{BlobStore, StorageError};
use dashmap::DashMap;

/// Blob store holding everything in memory.
///
/// Used for session-scoped data and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
