//! Periodic and on-demand reconciliation with the remote endpoint.
//!
//! One sync cycle fetches the remote snapshot, merges it into the widget
//! state and reports the outcome. Cycles never overlap: a trigger that
//! arrives while a cycle is running is skipped rather than queued.

use crate::app::QuoteApp;
use crate::remote::RemoteSyncClient;
use crate::status::StatusMessage;
use chrono::{DateTime, Utc};
use quotesync_engine::Conflict;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Whether a sync cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Terminal state of one sync trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "detail")]
pub enum SyncStatus {
    /// Merged without conflicts
    Clean,
    /// Merged; this many local records were overwritten by remote content
    Conflicts(usize),
    /// Fetch failed, local state untouched
    Failed(String),
    /// Another cycle was already running
    Skipped,
}

/// Outcome of one sync trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub status: SyncStatus,
    /// Remote quotes received
    pub fetched: usize,
    /// Remote quotes that were new locally
    pub appended: usize,
    /// Conflicts resolved in favour of the remote side
    pub conflicts: Vec<Conflict>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    fn without_merge(status: SyncStatus) -> Self {
        Self {
            status,
            fetched: 0,
            appended: 0,
            conflicts: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// Status message for the presentation layer.
    pub fn message(&self) -> StatusMessage {
        match &self.status {
            SyncStatus::Clean => StatusMessage::success("Quotes synced with server."),
            SyncStatus::Conflicts(n) => StatusMessage::warning(format!(
                "Synced with server: {} conflict(s) resolved using server data.",
                n
            )),
            SyncStatus::Failed(reason) => {
                StatusMessage::error(format!("Sync with server failed: {}", reason))
            }
            SyncStatus::Skipped => StatusMessage::info("Sync already in progress."),
        }
    }
}

/// Publishes `Syncing` while alive and `Idle` once dropped, so a cancelled
/// cycle still returns to `Idle`.
struct SyncingGuard<'a> {
    state: &'a watch::Sender<SyncState>,
}

impl<'a> SyncingGuard<'a> {
    fn enter(state: &'a watch::Sender<SyncState>) -> Self {
        state.send_replace(SyncState::Syncing);
        Self { state }
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(SyncState::Idle);
    }
}

/// Drives sync cycles on a timer and on demand.
pub struct SyncScheduler {
    app: Arc<QuoteApp>,
    remote: Arc<RemoteSyncClient>,
    period: Duration,
    /// Held for the duration of a cycle
    in_flight: Mutex<()>,
    state: watch::Sender<SyncState>,
}

impl SyncScheduler {
    /// Create a scheduler syncing every `period`.
    pub fn new(app: Arc<QuoteApp>, remote: Arc<RemoteSyncClient>, period: Duration) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            app,
            remote,
            period,
            in_flight: Mutex::new(()),
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Run one sync cycle now, unless one is already running.
    pub async fn sync_now(&self) -> SyncReport {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Sync already in flight, skipping trigger");
            let report = SyncReport::without_merge(SyncStatus::Skipped);
            self.app.notify(report.message());
            return report;
        };

        let syncing = SyncingGuard::enter(&self.state);
        let report = self.run_cycle().await;
        drop(syncing);

        self.app.notify(report.message());
        report
    }

    async fn run_cycle(&self) -> SyncReport {
        let remote = match self.remote.fetch_remote().await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(error = %e, endpoint = %self.remote.endpoint(), "Sync failed");
                return SyncReport::without_merge(SyncStatus::Failed(e.to_string()));
            }
        };

        let outcome = self.app.apply_remote(&remote).await;
        let status = if outcome.is_clean() {
            SyncStatus::Clean
        } else {
            SyncStatus::Conflicts(outcome.conflicts.len())
        };

        tracing::info!(
            fetched = remote.len(),
            appended = outcome.appended,
            conflicts = outcome.conflicts.len(),
            "Sync completed"
        );

        SyncReport {
            status,
            fetched: remote.len(),
            appended: outcome.appended,
            conflicts: outcome.conflicts,
            finished_at: Utc::now(),
        }
    }

    /// Run a cycle every period for the rest of the process lifetime.
    ///
    /// The first cycle starts one period after spawning.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let report = self.sync_now().await;
                tracing::debug!(status = ?report.status, "Scheduled sync finished");
            }
        })
    }
}
