//! # Quotesync Engine
//!
//! A deterministic quote collection with local/remote reconciliation.
//!
//! This crate provides the core logic of the quote widget: the in-memory
//! collection, category filtering, the stored/exported blob format, and the
//! merge of remote snapshots into local state. The same inputs always produce
//! the same outputs.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Testable**: Pure logic, no mocks needed
//! - **Portable**: Runs anywhere Rust runs (native, WASM, embedded)
//!
//! ## Core Concepts
//!
//! ### Quotes
//!
//! A [`Quote`] is `{id, text, category}`. Locally authored quotes have no id
//! until the remote side assigns one; remote quotes always carry one and are
//! filed under [`REMOTE_CATEGORY`].
//!
//! ### Store
//!
//! [`QuoteStore`] owns the collection, validates additions and tracks
//! whether it needs persisting.
//!
//! ### Reconciliation
//!
//! [`merge`] folds a remote snapshot into the local collection with server
//! precedence: unknown ids are appended, differing records are overwritten
//! and reported as [`Conflict`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use quotesync_engine::{Quote, QuoteStore, CategoryIndex};
//!
//! let mut store = QuoteStore::new();
//! store.add("Stay curious.", "Motivation").unwrap();
//!
//! let outcome = store.merge(&[Quote::from_remote(1, "sunt aut facere")]);
//! assert!(outcome.is_clean());
//! assert_eq!(store.len(), 2);
//!
//! let index = CategoryIndex::from_quotes(store.all());
//! assert_eq!(index.options(), vec!["all", "Motivation", "Server"]);
//! assert_eq!(index.resolve("Poetry"), "all");
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for presentation layers
//! written in other languages. All data is exchanged as JSON strings.
//!
//! ## Persistence
//!
//! The [`snapshot`] module encodes and decodes the stored and exported
//! forms of the collection. Decoding stored data never fails; unreadable
//! blobs decode to an empty collection.

pub mod category;
pub mod error;
pub mod ffi;
pub mod quote;
pub mod reconcile;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use category::{matches_filter, resolve_filter, CategoryIndex, ALL_CATEGORIES};
pub use error::Error;
pub use quote::{default_quotes, Quote, QuoteFields, REMOTE_CATEGORY};
pub use reconcile::{merge, Conflict, MergeOutcome};
pub use snapshot::Decoded;
pub use store::QuoteStore;

/// Identity assigned to a quote by the remote side.
pub type QuoteId = i64;
