//! The HTTP remote source.
//!
//! One GET fetches the full remote list; one POST per record pushes a local
//! winner back upstream. Both map onto the [`RemoteSource`] trait so tests
//! and embedders can substitute their own transport.

use crate::error::{Result, SyncError};
use async_trait::async_trait;
use quotesync_engine::{Record, RemoteItem};
use serde::Serialize;

/// Author id attached to push-back writes.
pub const DEFAULT_AUTHOR_ID: u64 = 1;

/// Wire shape of a push-back write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload<'a> {
    title: &'a str,
    body: &'a str,
    author_id: u64,
}

/// A source of remote snapshots and sink for push-back writes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the remote list.
    ///
    /// Any transport failure, non-success status, or unparseable payload is
    /// a [`SyncError::Fetch`]; no partial output is ever produced.
    async fn fetch(&self) -> Result<Vec<RemoteItem>>;

    /// Push one record upstream. Callers treat failures as best effort.
    async fn push(&self, record: &Record) -> Result<()>;
}

/// `reqwest`-backed remote source against a single configured endpoint.
pub struct HttpRemote {
    client: reqwest::Client,
    url: String,
}

impl HttpRemote {
    /// Create a remote source for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch(&self) -> Result<Vec<RemoteItem>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SyncError::Fetch(e.to_string()))?;

        response
            .json::<Vec<RemoteItem>>()
            .await
            .map_err(|e| SyncError::Fetch(format!("malformed payload: {e}")))
    }

    async fn push(&self, record: &Record) -> Result<()> {
        let payload = PushPayload {
            title: &record.text,
            body: &record.category,
            author_id: DEFAULT_AUTHOR_ID,
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SyncError::Push(e.to_string()))?;

        Ok(())
    }
}
