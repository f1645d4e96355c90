//! Error types for the sync layer.

use bclake_client::ClientError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can end a sync unit.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Token, request or pagination failure while fetching.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The sink is not configured, or the write itself failed.
    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
