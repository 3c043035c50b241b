/**
 * Sync Event System
 *
 * This module defines the notification channel between the connectivity
 * monitor, the sync coordinator, and anything listening to them (the
 * offline manager, UI code, loggers).
 *
 * Events serialize with the tag names UI code listens for:
 * `connectivity-changed`, `sync-queue-updated`, and `sync-completed`.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What caused a drain of the action queue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// Connectivity went from offline to online
    Reconnect,
    /// Periodic timer
    Periodic,
    /// Explicit request from the UI
    Manual,
}

/// Aggregate result of one drain cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    /// Trigger that started the cycle
    pub trigger: SyncTrigger,
    /// Actions confirmed by the server and removed
    pub synced: usize,
    /// Actions whose submission failed
    pub failed: usize,
    /// Actions not attempted because an earlier failure blocked them
    pub skipped: usize,
    /// Queue depth after the cycle
    pub remaining: usize,
    /// When the cycle finished
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Whether every attempted action succeeded
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Event broadcast by the sync machinery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncEvent {
    /// Connectivity flipped
    ConnectivityChanged {
        /// New connectivity state
        is_online: bool,
    },
    /// Queue depth changed
    SyncQueueUpdated {
        /// Depth after the change
        depth: usize,
        /// Signed change (+1 on enqueue, -1 on removal)
        delta: i64,
    },
    /// A drain cycle finished
    SyncCompleted(SyncReport),
}

impl SyncEvent {
    /// Create a connectivity event
    pub fn connectivity(is_online: bool) -> Self {
        Self::ConnectivityChanged { is_online }
    }

    /// Create a queue depth event
    pub fn queue_updated(depth: usize, delta: i64) -> Self {
        Self::SyncQueueUpdated { depth, delta }
    }

    /// Name UI listeners subscribe to
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectivityChanged { .. } => "connectivity-changed",
            Self::SyncQueueUpdated { .. } => "sync-queue-updated",
            Self::SyncCompleted(_) => "sync-completed",
        }
    }
}
