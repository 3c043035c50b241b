//! # Sync Coordinator
//!
//! One drain walks the queue snapshot in insertion order and submits each
//! action. A confirmed action is removed; a failed one stays queued with its
//! attempt counter bumped. What a failure does to the rest of the cycle is
//! decided by [`FailurePolicy`]:
//!
//! - `BlockSameKind`: later actions of the failed kind are skipped, other
//!   kinds keep going. An order that cannot be placed does not hold back a
//!   profile edit.
//! - `BlockAll`: the cycle stops at the first failure.
//!
//! Only one drain runs at a time per coordinator. The flag is taken before
//! the first await point and released by a guard, so a dropped drain future
//! frees it as well.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

use crate::client::api::RemoteApi;
use crate::client::error::StoreResult;
use crate::client::offline::queue::ActionStore;
use crate::client::sync::metrics::SyncMetrics;
use crate::client::sync::network_monitor::ConnectivityMonitor;
use crate::client::sync::{broadcast_event, SyncEventBroadcast};
use crate::shared::{ActionKind, FailurePolicy, SyncEvent, SyncReport, SyncTrigger};

/// Result of asking the coordinator to drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The cycle ran to completion
    Completed(SyncReport),
    /// Another drain holds the guard; nothing was submitted
    AlreadyRunning,
    /// The monitor reports offline; nothing was submitted
    Offline,
}

impl DrainOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            DrainOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Drains the action store against the remote API
pub struct SyncCoordinator {
    store: Arc<dyn ActionStore>,
    api: Arc<dyn RemoteApi>,
    monitor: Arc<ConnectivityMonitor>,
    policy: FailurePolicy,
    draining: AtomicBool,
    events: SyncEventBroadcast,
    metrics: RwLock<SyncMetrics>,
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("draining", &self.is_draining())
            .finish_non_exhaustive()
    }
}

/// Clears the drain flag when dropped
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<dyn ActionStore>,
        api: Arc<dyn RemoteApi>,
        monitor: Arc<ConnectivityMonitor>,
        policy: FailurePolicy,
        events: SyncEventBroadcast,
    ) -> Self {
        Self {
            store,
            api,
            monitor,
            policy,
            draining: AtomicBool::new(false),
            events,
            metrics: RwLock::new(SyncMetrics::default()),
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn ActionStore> {
        &self.store
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// Whether a drain currently holds the guard
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Receiver for the events this coordinator publishes
    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn metrics(&self) -> SyncMetrics {
        self.metrics.read().await.clone()
    }

    fn try_begin(&self) -> Option<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard(&self.draining))
    }

    /// Run one drain cycle
    ///
    /// Store failures abort the cycle and are returned; submission failures
    /// are recorded on the action and counted in the report.
    pub async fn drain(&self, trigger: SyncTrigger) -> StoreResult<DrainOutcome> {
        if !self.monitor.is_online() {
            tracing::debug!("Skipping {:?} drain while offline", trigger);
            return Ok(DrainOutcome::Offline);
        }
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Ignoring {:?} trigger, a drain is already running", trigger);
            self.metrics.write().await.overlapping_triggers += 1;
            return Ok(DrainOutcome::AlreadyRunning);
        };

        let started = Instant::now();
        let actions = self.store.dequeue_all().await.map_err(|e| {
            tracing::error!("Failed to read the action queue: {}", e);
            e
        })?;
        tracing::info!("Draining {} queued action(s) ({:?})", actions.len(), trigger);

        let mut synced = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut blocked: HashSet<ActionKind> = HashSet::new();
        let mut halted = false;

        for action in actions {
            if halted || blocked.contains(&action.kind) {
                skipped += 1;
                continue;
            }
            if !self.monitor.is_online() {
                tracing::warn!("Connectivity lost mid-drain, leaving the rest queued");
                halted = true;
                skipped += 1;
                continue;
            }

            tracing::debug!("Submitting {} action {}", action.kind, action.id);
            match self.api.submit(&action).await {
                Ok(()) => {
                    if self.store.remove(&action.id).await? {
                        let depth = self.store.count().await?;
                        broadcast_event(&self.events, SyncEvent::queue_updated(depth, -1));
                    }
                    synced += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to sync {} action {}: {}", action.kind, action.id, e);
                    self.store.record_failure(&action.id, &e.to_string()).await?;
                    failed += 1;
                    match self.policy {
                        FailurePolicy::BlockSameKind => {
                            blocked.insert(action.kind);
                        }
                        FailurePolicy::BlockAll => halted = true,
                    }
                }
            }
        }

        let report = SyncReport {
            trigger,
            synced,
            failed,
            skipped,
            remaining: self.store.count().await?,
            finished_at: Utc::now(),
        };
        self.metrics.write().await.record(&report, started.elapsed());

        if report.is_clean() {
            tracing::info!("Sync complete: {} synced", report.synced);
        } else {
            tracing::warn!(
                "Sync finished with problems: {} synced, {} failed, {} skipped, {} remaining",
                report.synced,
                report.failed,
                report.skipped,
                report.remaining
            );
        }
        broadcast_event(&self.events, SyncEvent::SyncCompleted(report.clone()));
        Ok(DrainOutcome::Completed(report))
    }
}
