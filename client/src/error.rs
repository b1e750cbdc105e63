//! Unified error handling for the sync client.

use crate::storage::StorageError;
use thiserror::Error;

/// Errors a sync cycle can surface.
///
/// A fetch error abandons the cycle before any mutation; a push error is
/// best effort and never fails the cycle at its call site; storage and
/// engine errors abort the cycle before anything is persisted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote fetch failed: {0}")]
    Fetch(String),

    #[error("push-back failed: {0}")]
    Push(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("engine error: {0}")]
    Engine(#[from] quotesync_engine::Error),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, SyncError>;
