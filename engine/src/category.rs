//! Category index and filter resolution.

use crate::Quote;
use std::collections::BTreeSet;

/// Filter value that matches every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Distinct categories of a collection.
///
/// Always rebuilt from the collection; it holds no state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: BTreeSet<String>,
}

impl CategoryIndex {
    /// Derive the index from a collection.
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        Self {
            categories: quotes.iter().map(|q| q.category.clone()).collect(),
        }
    }

    /// The distinct categories.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Filter options for display: the `"all"` sentinel first, then every
    /// category in sorted order.
    pub fn options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories.iter().cloned())
            .collect()
    }

    /// Check whether `category` occurs in the collection.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Resolve a persisted filter value against this index.
    pub fn resolve(&self, persisted: &str) -> String {
        resolve_filter(persisted, &self.categories)
    }
}

/// Return `persisted` if it is `"all"` or a known category, else `"all"`.
pub fn resolve_filter(persisted: &str, available: &BTreeSet<String>) -> String {
    if persisted == ALL_CATEGORIES || available.contains(persisted) {
        persisted.to_string()
    } else {
        ALL_CATEGORIES.to_string()
    }
}

/// Whether `quote` passes `filter`.
pub fn matches_filter(filter: &str, quote: &Quote) -> bool {
    filter == ALL_CATEGORIES || quote.category == filter
}
