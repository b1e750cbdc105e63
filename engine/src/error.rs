//! Error types for the QuoteSync engine.

use thiserror::Error;

/// All possible errors from the QuoteSync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("record text is empty after trimming")]
    EmptyText,

    // Reconciliation errors
    #[error("resolution count mismatch: {conflicts} conflict(s), {resolutions} resolution(s)")]
    ResolutionCountMismatch {
        conflicts: usize,
        resolutions: usize,
    },

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid identity cache: {0}")]
    InvalidCache(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
