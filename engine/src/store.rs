//! QuoteStore - the in-memory collection.
//!
//! The store owns the authoritative list of quotes. It validates new quotes,
//! delegates remote merges to [`crate::reconcile`], and tracks whether the
//! collection changed since it was last persisted.

use crate::{
    category::{matches_filter, CategoryIndex},
    error::Result,
    reconcile::{self, MergeOutcome},
    Error, Quote, QuoteId,
};

/// The quote collection.
///
/// Insertion order is preserved. Ids are not required to be unique here;
/// uniqueness is restored by [`QuoteStore::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
    /// Set by every mutation, cleared by the persistence layer
    dirty: bool,
}

impl QuoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `quotes`, considered already persisted.
    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self {
            quotes,
            dirty: false,
        }
    }

    /// All quotes in insertion order.
    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the store holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Add a locally authored quote.
    ///
    /// Fails with [`Error::EmptyField`] if either field is blank after
    /// trimming; the collection is left untouched in that case.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new_local(text, category)?;
        self.quotes.push(quote.clone());
        self.dirty = true;
        Ok(quote)
    }

    /// Append already validated quotes. Returns how many were appended.
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) -> usize {
        let before = self.quotes.len();
        self.quotes.extend(quotes);
        let added = self.quotes.len() - before;
        if added > 0 {
            self.dirty = true;
        }
        added
    }

    /// Find the first quote carrying `id`.
    pub fn find_by_id(&self, id: QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == Some(id))
    }

    /// Position of the first quote carrying `id`.
    pub fn position_of(&self, id: QuoteId) -> Option<usize> {
        self.quotes.iter().position(|q| q.id == Some(id))
    }

    /// Replace the quote at `index`.
    pub fn replace(&mut self, index: usize, quote: Quote) -> Result<()> {
        let len = self.quotes.len();
        let slot = self
            .quotes
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = quote;
        self.dirty = true;
        Ok(())
    }

    /// Merge a remote snapshot into the collection (server precedence).
    pub fn merge(&mut self, remote: &[Quote]) -> MergeOutcome {
        let outcome = reconcile::merge(&self.quotes, remote);
        if outcome.changed() {
            self.quotes = outcome.merged.clone();
            self.dirty = true;
        }
        outcome
    }

    /// Quotes passing the category `filter`.
    pub fn matching(&self, filter: &str) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| matches_filter(filter, q))
            .collect()
    }

    /// Category index of the current collection.
    pub fn category_index(&self) -> CategoryIndex {
        CategoryIndex::from_quotes(&self.quotes)
    }

    /// Whether the collection changed since the last [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the current collection has been persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
