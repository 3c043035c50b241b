//! # Sync State Management
//!
//! [`SyncStatus`] is what UI code renders: an offline indicator and an
//! "items waiting to sync" counter. It is derived from the connectivity
//! monitor and the queue depth and published through a watch channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::client::sync::network_monitor::ConnectivityState;

/// Reactive status exposed to UI code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub is_online: bool,
    pub last_online: Option<DateTime<Utc>>,
    /// At least one action is waiting to sync
    pub sync_pending: bool,
    /// Queue depth
    pub sync_items: usize,
}

impl SyncStatus {
    pub fn derive(connectivity: ConnectivityState, queue_depth: usize) -> Self {
        Self {
            is_online: connectivity.is_online,
            last_online: connectivity.last_online,
            sync_pending: queue_depth > 0,
            sync_items: queue_depth,
        }
    }
}

/// Watch channel holding the latest [`SyncStatus`]
///
/// Publishing an identical status does not wake subscribers.
#[derive(Debug)]
pub struct SyncStatusCell {
    tx: watch::Sender<SyncStatus>,
}

impl SyncStatusCell {
    pub fn new(initial: SyncStatus) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> SyncStatus {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.tx.subscribe()
    }

    /// Publish a new status; returns whether it differed
    pub fn publish(&self, status: SyncStatus) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        })
    }
}
