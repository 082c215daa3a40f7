//! Quotesync Client - the runtime around the quote engine.
//!
//! This crate wires the pure [`quotesync_engine`] collection to durable
//! storage and to the remote quote endpoint, and exposes [`QuoteApp`] as the
//! single entry point for a presentation layer.
//!
//! ## Data flow
//!
//! 1. [`PersistenceAdapter`] hydrates the collection at startup
//! 2. The presentation layer calls [`QuoteApp`] to show, add, filter,
//!    import and export quotes; every mutation is persisted immediately
//! 3. [`SyncScheduler`] periodically (or on demand) fetches the remote
//!    snapshot through [`RemoteSyncClient`] and merges it into the app
//! 4. Outcomes reach the presentation layer as [`StatusMessage`]s

pub mod app;
pub mod config;
pub mod error;
pub mod persistence;
pub mod remote;
pub mod scheduler;
pub mod status;
pub mod storage;

pub use app::QuoteApp;
pub use config::{Config, ConfigError};
pub use error::{ClientError, Result};
pub use persistence::{LoadedQuotes, PersistenceAdapter};
pub use remote::RemoteSyncClient;
pub use scheduler::{SyncReport, SyncScheduler, SyncState, SyncStatus};
pub use status::{StatusKind, StatusMessage};
pub use storage::{BlobStore, FileStore, MemoryStore, StorageError};
