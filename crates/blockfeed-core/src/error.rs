//! Error types for the block feed pipeline.

use thiserror::Error;

/// Errors that can occur in the feed core.
///
/// None of these are fatal to the process: source failures are retried on the
/// next tick, and the others are reported to the immediate caller only.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A call to the block source failed. Transient; the ingestion loop
    /// retries on its next tick.
    #[error("block source unavailable: {0}")]
    SourceUnavailable(String),

    /// A malformed address was passed to interest management.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// `latest()` was called before any block was ingested.
    #[error("no blocks ingested yet")]
    EmptyStore,
}

impl FeedError {
    /// Returns `true` if the error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}
