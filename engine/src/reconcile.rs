//! Reconciliation of the local collection against a remote snapshot.
//!
//! Given the local quotes and the quotes fetched from the remote endpoint,
//! this module produces the merged collection and a report of every record
//! on which both sides disagreed.
//!
//! # Algorithm
//!
//! 1. Index local quotes by id (first occurrence wins)
//! 2. Collapse repeated remote ids: the last copy wins, placed where the id
//!    first appeared
//! 3. Walk the remote quotes in that order
//! 4. Unknown id: append the remote quote
//! 5. Known id, same text and category: nothing to do
//! 6. Known id, anything differs: record a conflict and overwrite the local
//!    quote in place with the remote one (server precedence)
//! 7. Drop later local duplicates of any id the remote side claimed
//!
//! Quotes without an id never match anything, including each other.

use crate::{Quote, QuoteFields, QuoteId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A record on which local and remote content disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The shared id
    pub id: QuoteId,
    /// Local content before the merge
    pub local: QuoteFields,
    /// Remote content, which replaced the local one
    pub server: QuoteFields,
}

/// Result of merging a remote snapshot into the local collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// The collection after the merge
    pub merged: Vec<Quote>,
    /// Conflicts in remote iteration order
    pub conflicts: Vec<Conflict>,
    /// Remote quotes appended as new content
    pub appended: usize,
    /// Local quotes overwritten by remote content
    pub updated: usize,
    /// Remote quotes already consistent with local state
    pub unchanged: usize,
    /// Local duplicates removed because another record now owns their id
    pub collapsed: usize,
}

impl MergeOutcome {
    /// True if no conflicts were detected.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// True if the merged collection differs from the local input.
    pub fn changed(&self) -> bool {
        self.appended > 0 || self.updated > 0 || self.collapsed > 0
    }
}

/// Merge `remote` into `local` with server precedence.
///
/// The result depends only on the inputs; conflict order follows the first
/// appearance of each id in `remote`.
pub fn merge(local: &[Quote], remote: &[Quote]) -> MergeOutcome {
    let mut merged = local.to_vec();
    let mut by_id: HashMap<QuoteId, usize> = HashMap::with_capacity(local.len());
    let mut duplicates: Vec<(QuoteId, usize)> = Vec::new();

    for (pos, quote) in local.iter().enumerate() {
        if let Some(id) = quote.id {
            if by_id.contains_key(&id) {
                duplicates.push((id, pos));
            } else {
                by_id.insert(id, pos);
            }
        }
    }

    let mut conflicts = Vec::new();
    let mut claimed: HashSet<QuoteId> = HashSet::new();
    let (mut appended, mut updated, mut unchanged) = (0, 0, 0);

    for incoming in collapse_remote(remote) {
        let Some(id) = incoming.id else {
            merged.push(incoming.clone());
            appended += 1;
            continue;
        };

        match by_id.get(&id) {
            None => {
                by_id.insert(id, merged.len());
                merged.push(incoming.clone());
                appended += 1;
            }
            Some(&pos) => {
                claimed.insert(id);
                let existing = &mut merged[pos];
                if existing.same_content(incoming) {
                    unchanged += 1;
                } else {
                    conflicts.push(Conflict {
                        id,
                        local: existing.fields(),
                        server: incoming.fields(),
                    });
                    *existing = incoming.clone();
                    updated += 1;
                }
            }
        }
    }

    let shadowed: HashSet<usize> = duplicates
        .into_iter()
        .filter(|(id, _)| claimed.contains(id))
        .map(|(_, pos)| pos)
        .collect();
    let collapsed = shadowed.len();
    if collapsed > 0 {
        merged = merged
            .into_iter()
            .enumerate()
            .filter(|(pos, _)| !shadowed.contains(pos))
            .map(|(_, quote)| quote)
            .collect();
    }

    MergeOutcome {
        merged,
        conflicts,
        appended,
        updated,
        unchanged,
        collapsed,
    }
}

/// One entry per remote id, holding its last copy at the position of its
/// first copy. Quotes without an id are kept as they are.
fn collapse_remote(remote: &[Quote]) -> Vec<&Quote> {
    let mut slots: HashMap<QuoteId, usize> = HashMap::with_capacity(remote.len());
    let mut collapsed: Vec<&Quote> = Vec::with_capacity(remote.len());

    for quote in remote {
        match quote.id {
            Some(id) => match slots.get(&id) {
                Some(&slot) => collapsed[slot] = quote,
                None => {
                    slots.insert(id, collapsed.len());
                    collapsed.push(quote);
                }
            },
            None => collapsed.push(quote),
        }
    }
    collapsed
}
