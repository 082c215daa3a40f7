//! The quote widget facade called by the presentation layer.
//!
//! [`QuoteApp`] is the single owner of the quote collection, the category
//! index and the active filter. Every mutation goes through it, is persisted
//! right away and leaves the index and filter consistent with the
//! collection.

use crate::error::Result;
use crate::persistence::PersistenceAdapter;
use crate::remote::RemoteSyncClient;
use crate::status::StatusMessage;
use quotesync_engine::{
    default_quotes, snapshot, CategoryIndex, MergeOutcome, Quote, QuoteStore, ALL_CATEGORIES,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Capacity of the status message channel.
const NOTICE_CAPACITY: usize = 64;

/// Mutable widget state, guarded as one unit.
#[derive(Debug)]
struct WidgetState {
    store: QuoteStore,
    index: CategoryIndex,
    filter: String,
    displayed: Option<Quote>,
}

impl WidgetState {
    /// Rebuild the index and drop the filter if its category vanished.
    /// Returns true if the filter changed.
    fn refresh_index(&mut self) -> bool {
        self.index = self.store.category_index();
        let resolved = self.index.resolve(&self.filter);
        let changed = resolved != self.filter;
        self.filter = resolved;
        changed
    }
}

/// Entry point for every user-visible operation of the widget.
pub struct QuoteApp {
    state: Mutex<WidgetState>,
    persistence: PersistenceAdapter,
    remote: Arc<RemoteSyncClient>,
    notices: broadcast::Sender<StatusMessage>,
}

impl QuoteApp {
    /// Restore the widget from persisted state.
    ///
    /// If no readable collection is stored, the default quotes are seeded
    /// and persisted. An unknown persisted filter falls back to `"all"`.
    pub fn hydrate(persistence: PersistenceAdapter, remote: Arc<RemoteSyncClient>) -> Self {
        let loaded = persistence.load_quotes();
        let mut store = if loaded.valid {
            QuoteStore::from_quotes(loaded.quotes)
        } else {
            tracing::info!(found = loaded.found, "Seeding default quotes");
            let mut store = QuoteStore::new();
            store.extend(default_quotes());
            store
        };
        if store.is_dirty() && persistence.save_quotes(store.all()) {
            store.mark_clean();
        }

        let index = store.category_index();
        let filter = persistence
            .load_filter()
            .map(|persisted| index.resolve(&persisted))
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());

        let displayed = persistence
            .load_last_viewed()
            .filter(|q| !q.text.is_empty() && !q.category.is_empty());

        tracing::info!(quotes = store.len(), filter = %filter, "Hydrated quote collection");

        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            state: Mutex::new(WidgetState {
                store,
                index,
                filter,
                displayed,
            }),
            persistence,
            remote,
            notices,
        }
    }

    /// Subscribe to status messages.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusMessage> {
        self.notices.subscribe()
    }

    /// Publish a status message to every subscriber.
    pub fn notify(&self, message: StatusMessage) {
        // No subscribers is fine
        let _ = self.notices.send(message);
    }

    /// Pick a random quote passing the active filter and display it.
    pub async fn show_random_quote(&self) -> Option<Quote> {
        let mut state = self.state.lock().await;

        let picked = {
            let candidates = state.store.matching(&state.filter);
            let mut rng = rand::thread_rng();
            candidates.choose(&mut rng).map(|q| (*q).clone())
        };

        match &picked {
            Some(quote) => {
                self.persistence.save_last_viewed(quote);
                state.displayed = Some(quote.clone());
            }
            None => self.notify(StatusMessage::info("No quotes available.")),
        }
        picked
    }

    /// The quote currently on display, restored from the session on startup.
    pub async fn last_viewed(&self) -> Option<Quote> {
        self.state.lock().await.displayed.clone()
    }

    /// Add a quote authored by the user and display it.
    ///
    /// The quote is also posted to the remote endpoint in the background;
    /// the result of that post does not affect this call.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        let quote = {
            let mut state = self.state.lock().await;
            let quote = match state.store.add(text, category) {
                Ok(quote) => quote,
                Err(e) => {
                    self.notify(StatusMessage::warning(
                        "Please enter both a quote and a category.",
                    ));
                    return Err(e.into());
                }
            };

            self.persist(&mut state);
            if state.refresh_index() {
                self.persistence.save_filter(&state.filter);
            }
            self.persistence.save_last_viewed(&quote);
            state.displayed = Some(quote.clone());
            quote
        };

        tracing::info!(category = %quote.category, "Added quote");
        self.remote.spawn_post(quote.clone());
        self.notify(StatusMessage::success("Quote added."));
        Ok(quote)
    }

    /// Set the active category filter and return the quotes it selects.
    ///
    /// An unknown category selects everything.
    pub async fn filter_quotes(&self, category: &str) -> Vec<Quote> {
        let mut state = self.state.lock().await;
        state.filter = state.index.resolve(category);
        self.persistence.save_filter(&state.filter);

        state
            .store
            .matching(&state.filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The active category filter.
    pub async fn active_filter(&self) -> String {
        self.state.lock().await.filter.clone()
    }

    /// Filter options, `"all"` first.
    pub async fn categories(&self) -> Vec<String> {
        self.state.lock().await.index.options()
    }

    /// Snapshot of the whole collection.
    pub async fn quotes(&self) -> Vec<Quote> {
        self.state.lock().await.store.all().to_vec()
    }

    /// Serialize the collection in the export format.
    pub async fn export_collection(&self) -> Result<String> {
        let state = self.state.lock().await;
        Ok(snapshot::encode_pretty(state.store.all())?)
    }

    /// Append the well-formed quotes of an export file.
    ///
    /// A file that is not a JSON array is rejected as a whole; malformed
    /// entries inside an array are skipped. Returns the number imported.
    pub async fn import_collection(&self, blob: &str) -> Result<usize> {
        let quotes = match snapshot::parse_import(blob) {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected import");
                self.notify(StatusMessage::error(
                    "Invalid JSON format. Expected an array of quotes.",
                ));
                return Err(e.into());
            }
        };

        let imported = {
            let mut state = self.state.lock().await;
            let imported = state.store.extend(quotes);
            self.persist(&mut state);
            if state.refresh_index() {
                self.persistence.save_filter(&state.filter);
            }
            imported
        };

        tracing::info!(imported, "Imported quotes");
        self.notify(StatusMessage::success(format!(
            "Imported {} quote(s).",
            imported
        )));
        Ok(imported)
    }

    /// Merge a fetched remote snapshot, persist, and refresh the filter.
    pub async fn apply_remote(&self, remote: &[Quote]) -> MergeOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.store.merge(remote);

        self.persist(&mut state);
        if state.refresh_index() {
            tracing::debug!("Active filter no longer exists, reset to all");
            self.persistence.save_filter(&state.filter);
        }

        outcome
    }

    /// Write the collection if it changed. A failed write keeps it dirty so
    /// the next mutation retries.
    fn persist(&self, state: &mut WidgetState) {
        if state.store.is_dirty() && self.persistence.save_quotes(state.store.all()) {
            state.store.mark_clean();
        }
    }
}
