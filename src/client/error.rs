//! Client Error Types
//!
//! - [`StoreError`]: the local action store failed. Surfaced to callers of
//!   `enqueue` and `dequeue_all`; an action that hit this error never entered
//!   the queue.
//! - [`ApiError`]: a submission to the remote API failed. Never surfaced to
//!   the original caller; the action stays queued and shows up in status.
//! - [`OfflineError`]: what the offline manager's `create_*`/`submit_*`
//!   methods return.

use thiserror::Error;
use uuid::Uuid;

use crate::shared::config::ConfigError;
use crate::shared::SharedError;

/// Local action store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("corrupt queue row {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn corrupt(id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Remote API submission errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("action {0} was rejected: {1}")]
    Rejected(Uuid, String),
}

impl ApiError {
    /// Whether the failure came from the transport rather than the server
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }
}

/// Offline manager errors
#[derive(Debug, Error)]
pub enum OfflineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("failed to build the API client: {0}")]
    Transport(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
