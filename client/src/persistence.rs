//! Durable and session persistence of widget state.
//!
//! Every read soft-fails to a default and every write failure is logged and
//! absorbed; callers never see a storage error.

use crate::storage::BlobStore;
use quotesync_engine::{snapshot, Quote};
use std::sync::Arc;

/// Key of the quote collection in the durable store.
pub const QUOTES_KEY: &str = "dynamic_quote_generator_quotes";
/// Key of the active category filter in the durable store.
pub const FILTER_KEY: &str = "dynamic_quote_generator_category_filter";
/// Key of the last displayed quote in the session store.
pub const LAST_QUOTE_KEY: &str = "dynamic_quote_generator_last_quote";

/// Result of loading the stored collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedQuotes {
    /// Well-formed stored quotes, empty on any failure
    pub quotes: Vec<Quote>,
    /// A blob existed under the collection key
    pub found: bool,
    /// The blob was a readable array
    pub valid: bool,
}

/// Reads and writes widget state under three independent keys.
#[derive(Clone)]
pub struct PersistenceAdapter {
    durable: Arc<dyn BlobStore>,
    session: Arc<dyn BlobStore>,
}

impl PersistenceAdapter {
    /// Create an adapter over a durable and a session-scoped store.
    pub fn new(durable: Arc<dyn BlobStore>, session: Arc<dyn BlobStore>) -> Self {
        Self { durable, session }
    }

    /// Persist the full collection. Returns whether it was stored.
    pub fn save_quotes(&self, quotes: &[Quote]) -> bool {
        match snapshot::encode(quotes) {
            Ok(blob) => write(self.durable.as_ref(), QUOTES_KEY, &blob),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode quotes");
                false
            }
        }
    }

    /// Load the stored collection, dropping malformed entries.
    pub fn load_quotes(&self) -> LoadedQuotes {
        let Some(blob) = read(self.durable.as_ref(), QUOTES_KEY) else {
            return LoadedQuotes::default();
        };

        let decoded = snapshot::decode_lenient(&blob);
        if !decoded.valid {
            tracing::warn!("Stored quotes are unreadable, starting from an empty collection");
        } else if decoded.dropped > 0 {
            tracing::warn!(dropped = decoded.dropped, "Discarded malformed stored quotes");
        }

        LoadedQuotes {
            quotes: decoded.quotes,
            found: true,
            valid: decoded.valid,
        }
    }

    /// Persist the active category filter.
    pub fn save_filter(&self, filter: &str) -> bool {
        write(self.durable.as_ref(), FILTER_KEY, filter)
    }

    /// Load the persisted category filter, if any.
    pub fn load_filter(&self) -> Option<String> {
        read(self.durable.as_ref(), FILTER_KEY)
    }

    /// Echo the displayed quote into the session store.
    pub fn save_last_viewed(&self, quote: &Quote) -> bool {
        match snapshot::encode_quote(quote) {
            Ok(blob) => write(self.session.as_ref(), LAST_QUOTE_KEY, &blob),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode last viewed quote");
                false
            }
        }
    }

    /// Load the last displayed quote of this session.
    pub fn load_last_viewed(&self) -> Option<Quote> {
        let blob = read(self.session.as_ref(), LAST_QUOTE_KEY)?;
        let quote = snapshot::decode_quote(&blob);
        if quote.is_none() {
            tracing::debug!("Ignoring unreadable last viewed quote");
        }
        quote
    }
}

fn read(store: &dyn BlobStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read from storage");
            None
        }
    }
}

fn write(store: &dyn BlobStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to write to storage");
            false
        }
    }
}
