//! # Background Sync Service
//!
//! A single spawned task that turns signals into drains:
//!
//! - connectivity flips offline → online: reconnect drain, backoff cleared
//! - scheduler tick: periodic drain, only while periodic sync is enabled
//!   and the backoff allows it
//! - [`SyncService::nudge`]: manual drain (the facade nudges after every
//!   enqueue while online)
//!
//! Overlapping signals are harmless; the coordinator rejects a second
//! concurrent drain.

use std::sync::Arc;

use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::client::sync::coordinator::{DrainOutcome, SyncCoordinator};
use crate::client::sync::network_monitor::ConnectivityState;
use crate::client::sync::scheduler::SyncScheduler;
use crate::shared::SyncTrigger;

/// Background task driving the coordinator
#[derive(Debug)]
pub struct SyncService {
    coordinator: Arc<SyncCoordinator>,
    scheduler: Arc<SyncScheduler>,
    nudge: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncService {
    pub fn new(coordinator: Arc<SyncCoordinator>, scheduler: Arc<SyncScheduler>) -> Self {
        Self {
            coordinator,
            scheduler,
            nudge: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &Arc<SyncScheduler> {
        &self.scheduler
    }

    /// Spawn the loop; returns `false` if it was already running
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        // Take the baseline here, not in the task: a flip between spawn and
        // first poll must still read as a change.
        let mut connectivity = self.coordinator.monitor().subscribe();
        let was_online = connectivity.borrow_and_update().is_online;
        let coordinator = Arc::clone(&self.coordinator);
        let scheduler = Arc::clone(&self.scheduler);
        let nudge = Arc::clone(&self.nudge);
        *task = Some(tokio::spawn(async move {
            Self::run(coordinator, scheduler, nudge, connectivity, was_online).await;
        }));
        tracing::info!("Background sync started");
        true
    }

    /// Abort the loop; a drain in flight is dropped and its action stays queued
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::info!("Background sync stopped");
        }
        self.scheduler.stop().await;
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Enable periodic drains; returns `false` if they already were
    pub async fn enable_periodic(&self) -> bool {
        if self.scheduler.is_active().await {
            return false;
        }
        self.scheduler.start().await;
        tracing::info!("Periodic sync every {:?}", self.scheduler.interval());
        true
    }

    /// Ask the loop for a manual drain
    pub fn nudge(&self) {
        self.nudge.notify_one();
    }

    async fn run(
        coordinator: Arc<SyncCoordinator>,
        scheduler: Arc<SyncScheduler>,
        nudge: Arc<Notify>,
        mut connectivity: watch::Receiver<ConnectivityState>,
        mut was_online: bool,
    ) {

        let mut ticker = tokio::time::interval(scheduler.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; periodic drains start one interval in.
        ticker.tick().await;

        loop {
            let trigger = tokio::select! {
                changed = connectivity.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Connectivity monitor dropped, stopping background sync");
                        break;
                    }
                    let online = connectivity.borrow_and_update().is_online;
                    let reconnected = online && !was_online;
                    was_online = online;
                    if !reconnected {
                        continue;
                    }
                    scheduler.reset_backoff().await;
                    SyncTrigger::Reconnect
                }
                _ = ticker.tick() => {
                    if !scheduler.should_sync().await {
                        continue;
                    }
                    if matches!(coordinator.store().count().await, Ok(0)) {
                        continue;
                    }
                    SyncTrigger::Periodic
                }
                _ = nudge.notified() => SyncTrigger::Manual,
            };

            match coordinator.drain(trigger).await {
                Ok(DrainOutcome::Completed(report)) => scheduler.record_cycle(&report).await,
                Ok(_) => {}
                Err(e) => tracing::error!("Sync cycle aborted: {}", e),
            }
        }
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
