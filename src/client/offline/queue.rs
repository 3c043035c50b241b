//! # Local Action Store
//!
//! The durable queue of not-yet-synced user actions.
//!
//! [`ActionStore`] is the seam between the sync machinery and persistence.
//! Two implementations exist:
//!
//! - [`MemoryActionStore`]: in-process queue, lost on restart (tests, previews)
//! - [`LocalDatabase`](crate::client::local_db::LocalDatabase): SQLite-backed,
//!   survives restarts
//!
//! ## Ordering
//!
//! Every enqueued action gets a store-assigned, strictly increasing `seq`.
//! `dequeue_all` returns actions by `seq`, so two enqueues within the same
//! clock tick still drain in call order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wolfpack_sync::client::offline::queue::{ActionStore, MemoryActionStore};
//! use wolfpack_sync::shared::ActionKind;
//!
//! # async fn example() -> Result<(), wolfpack_sync::client::error::StoreError> {
//! let store = MemoryActionStore::new();
//! let action = store.enqueue(ActionKind::Feedback, serde_json::json!({"rating": 5})).await?;
//!
//! for pending in store.dequeue_all().await? {
//!     // submit...
//!     store.remove(&pending.id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::error::{StoreError, StoreResult};
use crate::shared::{ActionKind, PendingAction};

/// Payload size limit used when none is configured
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Persistent queue of pending actions
#[async_trait]
pub trait ActionStore: Send + Sync + std::fmt::Debug {
    /// Persist a new action and return it with its generated id
    async fn enqueue(&self, kind: ActionKind, payload: serde_json::Value) -> StoreResult<PendingAction>;

    /// Snapshot of the queue, oldest first
    async fn dequeue_all(&self) -> StoreResult<Vec<PendingAction>>;

    /// Delete one action; `false` if it was not queued
    async fn remove(&self, id: &Uuid) -> StoreResult<bool>;

    /// Current queue depth
    async fn count(&self) -> StoreResult<usize>;

    /// Record a failed submission attempt
    async fn record_failure(&self, id: &Uuid, error: &str) -> StoreResult<()>;

    /// Drop every queued action, returning how many were removed
    async fn clear(&self) -> StoreResult<usize>;
}

/// Reject payloads the queue cannot hold
pub fn check_payload(payload: &serde_json::Value, limit: usize) -> StoreResult<()> {
    if !payload.is_object() {
        return Err(StoreError::PayloadNotObject);
    }
    let size = serde_json::to_vec(payload)?.len();
    if size > limit {
        return Err(StoreError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

/// In-memory action store
#[derive(Debug)]
pub struct MemoryActionStore {
    inner: RwLock<MemoryQueue>,
    max_payload_bytes: usize,
}

#[derive(Debug, Default)]
struct MemoryQueue {
    actions: VecDeque<PendingAction>,
    next_seq: i64,
}

impl MemoryActionStore {
    /// Create an empty store with the default payload limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_PAYLOAD_BYTES)
    }

    /// Create an empty store with a custom payload limit
    pub fn with_limit(max_payload_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryQueue::default()),
            max_payload_bytes,
        }
    }
}

impl Default for MemoryActionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionStore for MemoryActionStore {
    async fn enqueue(&self, kind: ActionKind, payload: serde_json::Value) -> StoreResult<PendingAction> {
        check_payload(&payload, self.max_payload_bytes)?;

        let mut queue = self.inner.write().await;
        queue.next_seq += 1;
        let action = PendingAction::new(kind, payload, queue.next_seq);
        queue.actions.push_back(action.clone());
        Ok(action)
    }

    async fn dequeue_all(&self) -> StoreResult<Vec<PendingAction>> {
        let queue = self.inner.read().await;
        Ok(queue.actions.iter().cloned().collect())
    }

    async fn remove(&self, id: &Uuid) -> StoreResult<bool> {
        let mut queue = self.inner.write().await;
        let before = queue.actions.len();
        queue.actions.retain(|action| action.id != *id);
        Ok(queue.actions.len() != before)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.read().await.actions.len())
    }

    async fn record_failure(&self, id: &Uuid, error: &str) -> StoreResult<()> {
        let mut queue = self.inner.write().await;
        if let Some(action) = queue.actions.iter_mut().find(|action| action.id == *id) {
            action.attempts += 1;
            action.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<usize> {
        let mut queue = self.inner.write().await;
        let removed = queue.actions.len();
        queue.actions.clear();
        Ok(removed)
    }
}
