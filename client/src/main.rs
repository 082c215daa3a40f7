//! Quotesync - headless quote widget runtime.
//!
//! Restores the quote collection, keeps it reconciled with the remote
//! endpoint on a timer, and logs every status message the widget emits.

use quotesync_client::{
    Config, FileStore, MemoryStore, PersistenceAdapter, QuoteApp, RemoteSyncClient, StatusKind,
    SyncScheduler,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotesync=info,quotesync_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        remote = %config.remote_url,
        data_dir = %config.data_dir.display(),
        interval_secs = config.sync_interval.as_secs(),
        "Starting Quotesync"
    );

    let durable = Arc::new(FileStore::open(&config.data_dir)?);
    let session = Arc::new(MemoryStore::new());
    let persistence = PersistenceAdapter::new(durable, session);

    let remote = Arc::new(RemoteSyncClient::new(
        config.remote_url.clone(),
        config.fetch_limit,
        config.user_id,
        config.http_timeout,
    )?);

    let app = Arc::new(QuoteApp::hydrate(persistence, remote.clone()));

    // Render status messages the way a UI would
    let mut notices = app.subscribe();
    tokio::spawn(async move {
        loop {
            let message = match notices.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Status log fell behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            match message.kind {
                StatusKind::Error => tracing::error!("{}", message.text),
                StatusKind::Warning => tracing::warn!("{}", message.text),
                StatusKind::Info | StatusKind::Success => tracing::info!("{}", message.text),
            }
        }
    });

    let shown = match app.last_viewed().await {
        Some(quote) => Some(quote),
        None => app.show_random_quote().await,
    };
    if let Some(quote) = shown {
        tracing::info!(category = %quote.category, "\"{}\"", quote.text);
    }

    let scheduler = Arc::new(SyncScheduler::new(
        app.clone(),
        remote,
        config.sync_interval,
    ));
    if config.sync_on_start {
        scheduler.sync_now().await;
    }
    let ticker = scheduler.clone().spawn();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    ticker.abort();

    Ok(())
}
