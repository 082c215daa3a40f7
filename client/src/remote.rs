//! Client for the remote quote endpoint.
//!
//! The endpoint is a generic mock REST resource: reads return a list of
//! `{id, title, ...}` items and writes accept `{title, body, userId}`.

use crate::error::{ClientError, Result};
use quotesync_engine::{Quote, QuoteId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// An item as returned by the remote endpoint. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct RemoteItem {
    id: QuoteId,
    title: String,
}

/// Body posted for a newly created local quote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostBody<'a> {
    title: &'a str,
    body: &'a str,
    user_id: i64,
}

/// Fetches remote quotes and posts local ones.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    http: reqwest::Client,
    endpoint: String,
    fetch_limit: usize,
    user_id: i64,
}

impl RemoteSyncClient {
    /// Create a client for `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        fetch_limit: usize,
        user_id: i64,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            fetch_limit,
            user_id,
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the current remote snapshot.
    ///
    /// Every item becomes a quote in the remote category. Any transport
    /// failure or non-success status fails the whole fetch.
    pub async fn fetch_remote(&self) -> Result<Vec<Quote>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("_limit", self.fetch_limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let items: Vec<RemoteItem> = response.json().await?;
        let quotes: Vec<Quote> = items
            .into_iter()
            .take(self.fetch_limit)
            .map(|item| Quote::from_remote(item.id, item.title))
            .collect();

        tracing::debug!(count = quotes.len(), endpoint = %self.endpoint, "Fetched remote quotes");
        Ok(quotes)
    }

    /// Send a locally created quote to the remote endpoint.
    pub async fn post_local(&self, quote: &Quote) -> Result<()> {
        let body = PostBody {
            title: &quote.text,
            body: &quote.category,
            user_id: self.user_id,
        };

        let response = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        tracing::debug!(status = status.as_u16(), "Posted local quote");
        Ok(())
    }

    /// Post `quote` in the background. Failures are logged, never returned.
    pub fn spawn_post(self: &Arc<Self>, quote: Quote) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = client.post_local(&quote).await {
                tracing::warn!(error = %e, "Failed to post quote to remote");
            }
        })
    }
}
