//! # Offline Actions
//!
//! Lets patrons place orders, edit their profile and leave feedback while
//! the device is offline.
//!
//! ## Architecture
//!
//! - `queue.rs`: the durable action queue ([`ActionStore`])
//! - `retry.rs`: backoff between failing periodic cycles
//! - `optimistic.rs`: show changes before the server confirms them
//!
//! [`OfflineManager`] ties the queue to the sync machinery and is what UI
//! code talks to. Every `create_*`/`submit_*` call validates the draft,
//! enqueues it locally, refreshes [`SyncStatus`], and nudges a drain when
//! online. It returns the action id as soon as the action is stored.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wolfpack_sync::client::config::Config;
//! use wolfpack_sync::client::offline::OfflineManager;
//! use wolfpack_sync::shared::{OrderDraft, OrderLine};
//!
//! # async fn example() -> Result<(), wolfpack_sync::client::error::OfflineError> {
//! let manager = OfflineManager::open(Config::from_env()?).await?;
//!
//! let draft = OrderDraft {
//!     items: vec![OrderLine { id: "wings".into(), qty: 2 }],
//!     total: 24.0,
//!     table_number: Some(7),
//!     notes: None,
//! };
//! let id = manager.create_order(&draft).await?;
//!
//! let mut status = manager.subscribe();
//! while status.changed().await.is_ok() {
//!     println!("{} item(s) waiting", status.borrow().sync_items);
//! }
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

pub mod optimistic;
pub mod queue;
pub mod retry;

pub use optimistic::{OptimisticLayer, PendingChange};
pub use queue::{ActionStore, MemoryActionStore};
pub use retry::BackoffStrategy;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::api::{HttpRemoteApi, RemoteApi};
use crate::client::config::Config;
use crate::client::error::{OfflineError, StoreResult};
use crate::client::local_db::LocalDatabase;
use crate::client::sync::network_monitor::{spawn_probe, ConnectivityProbe, HttpProbe};
use crate::client::sync::{
    broadcast_event, event_channel, ConnectivityMonitor, DrainOutcome, SyncCoordinator, SyncEventBroadcast,
    SyncMetrics, SyncScheduler, SyncService, SyncStatus, SyncStatusCell,
};
use crate::shared::{
    ActionKind, AppConfig, FeedbackSubmission, OrderDraft, PendingAction, ProfileChanges, SharedError, SyncEvent,
    SyncTrigger,
};

/// Facade over the action queue and the sync machinery
pub struct OfflineManager {
    store: Arc<dyn ActionStore>,
    monitor: Arc<ConnectivityMonitor>,
    service: Arc<SyncService>,
    status: Arc<SyncStatusCell>,
    events: SyncEventBroadcast,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for OfflineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineManager")
            .field("status", &self.status.current())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl OfflineManager {
    /// Open the on-disk queue, talk to the configured server and probe it
    /// for connectivity
    pub async fn open(config: Config) -> Result<Self, OfflineError> {
        let database = LocalDatabase::from_config(config.app()).await?;
        let api = Arc::new(HttpRemoteApi::new(config.clone())?);
        let probe: Arc<dyn ConnectivityProbe> = Arc::new(HttpProbe::new(&config)?);

        let online = probe.check().await;
        let mut manager = Self::with_database(config.app(), database, api, online).await?;

        let handle = spawn_probe(manager.monitor.clone(), probe, config.app().probe_interval());
        manager.tasks.push(handle);
        Ok(manager)
    }

    /// Build on a SQLite queue; connectivity and sync times persist in it
    pub async fn with_database(
        config: &AppConfig,
        database: LocalDatabase,
        api: Arc<dyn RemoteApi>,
        initially_online: bool,
    ) -> StoreResult<Self> {
        let store: Arc<dyn ActionStore> = Arc::new(database.clone());
        let manager = Self::assemble(config, store, api, initially_online, Some(database.clone())).await?;

        if let Some(at) = database.last_online().await? {
            manager.monitor.restore_last_online(at);
        }
        if initially_online {
            database.set_last_online(Utc::now()).await?;
        }
        manager.refresh_status().await?;
        Ok(manager)
    }

    /// Build on any store, without persisted metadata
    pub async fn new(
        config: &AppConfig,
        store: Arc<dyn ActionStore>,
        api: Arc<dyn RemoteApi>,
        initially_online: bool,
    ) -> StoreResult<Self> {
        Self::assemble(config, store, api, initially_online, None).await
    }

    async fn assemble(
        config: &AppConfig,
        store: Arc<dyn ActionStore>,
        api: Arc<dyn RemoteApi>,
        initially_online: bool,
        database: Option<LocalDatabase>,
    ) -> StoreResult<Self> {
        let events = event_channel();
        let monitor = Arc::new(ConnectivityMonitor::new(initially_online, events.clone()));
        let coordinator = Arc::new(SyncCoordinator::new(
            store.clone(),
            api,
            monitor.clone(),
            config.failure_policy,
            events.clone(),
        ));
        let scheduler = Arc::new(SyncScheduler::new(
            config.sync_interval(),
            BackoffStrategy::from_config(config),
        ));
        let service = Arc::new(SyncService::new(coordinator, scheduler));

        let depth = store.count().await?;
        let status = Arc::new(SyncStatusCell::new(SyncStatus::derive(monitor.status(), depth)));

        let pump = tokio::spawn(status_pump(
            store.clone(),
            database,
            monitor.clone(),
            status.clone(),
            events.subscribe(),
            monitor.subscribe(),
        ));
        service.start().await;
        tracing::info!("Offline manager ready with {} queued action(s)", depth);

        Ok(Self {
            store,
            monitor,
            service,
            status,
            events,
            tasks: vec![pump],
        })
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    pub fn last_online(&self) -> Option<DateTime<Utc>> {
        self.monitor.status().last_online
    }

    /// Latest published status
    pub fn status(&self) -> SyncStatus {
        self.status.current()
    }

    /// Receiver that wakes whenever the status changes
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Raw sync events (`connectivity-changed`, `sync-queue-updated`,
    /// `sync-completed`)
    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Platform connectivity report
    pub fn set_online(&self, online: bool) -> bool {
        self.monitor.set_online(online)
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Uuid, OfflineError> {
        draft.validate()?;
        self.enqueue(ActionKind::Order, to_payload(draft)?).await
    }

    pub async fn update_profile(&self, changes: &ProfileChanges) -> Result<Uuid, OfflineError> {
        changes.validate()?;
        self.enqueue(ActionKind::ProfileUpdate, to_payload(changes)?).await
    }

    pub async fn submit_feedback(&self, feedback: &FeedbackSubmission) -> Result<Uuid, OfflineError> {
        feedback.validate()?;
        self.enqueue(ActionKind::Feedback, to_payload(feedback)?).await
    }

    async fn enqueue(&self, kind: ActionKind, payload: serde_json::Value) -> Result<Uuid, OfflineError> {
        let action = self.store.enqueue(kind, payload).await.map_err(|e| {
            tracing::error!("Failed to queue {} action: {}", kind, e);
            e
        })?;
        tracing::debug!("Queued {} action {}", kind, action.id);

        let status = self.refresh_status().await?;
        broadcast_event(&self.events, SyncEvent::queue_updated(status.sync_items, 1));
        if self.monitor.is_online() {
            self.service.nudge();
        }
        Ok(action.id)
    }

    /// Actions waiting to sync, oldest first
    pub async fn pending_items(&self) -> StoreResult<Vec<PendingAction>> {
        self.store.dequeue_all().await
    }

    /// Enable periodic background sync at the configured interval
    ///
    /// Returns `false` if it was already enabled.
    pub async fn register_periodic_update(&self) -> bool {
        self.service.enable_periodic().await
    }

    /// Drain now and wait for the result
    pub async fn sync_now(&self) -> StoreResult<DrainOutcome> {
        let outcome = self.service.coordinator().drain(SyncTrigger::Manual).await?;
        if let DrainOutcome::Completed(report) = &outcome {
            self.service.scheduler().record_cycle(report).await;
        }
        self.refresh_status().await?;
        Ok(outcome)
    }

    /// Drop a queued action the user gave up on
    pub async fn evict(&self, id: &Uuid) -> StoreResult<bool> {
        let removed = self.store.remove(id).await?;
        if removed {
            tracing::info!("Evicted queued action {}", id);
            let status = self.refresh_status().await?;
            broadcast_event(&self.events, SyncEvent::queue_updated(status.sync_items, -1));
        }
        Ok(removed)
    }

    pub async fn metrics(&self) -> SyncMetrics {
        self.service.coordinator().metrics().await
    }

    /// Stop background work; queued actions stay queued
    pub async fn shutdown(&self) {
        self.service.stop().await;
        for task in &self.tasks {
            task.abort();
        }
    }

    async fn refresh_status(&self) -> StoreResult<SyncStatus> {
        refresh(&*self.store, &self.monitor, &self.status).await
    }
}

impl Drop for OfflineManager {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn to_payload<T: Serialize>(draft: &T) -> Result<serde_json::Value, SharedError> {
    Ok(serde_json::to_value(draft)?)
}

async fn refresh(
    store: &dyn ActionStore,
    monitor: &ConnectivityMonitor,
    status: &SyncStatusCell,
) -> StoreResult<SyncStatus> {
    let depth = store.count().await?;
    let next = SyncStatus::derive(monitor.status(), depth);
    status.publish(next);
    Ok(next)
}

/// Keeps the published status in step with the monitor and the coordinator
async fn status_pump(
    store: Arc<dyn ActionStore>,
    database: Option<LocalDatabase>,
    monitor: Arc<ConnectivityMonitor>,
    status: Arc<SyncStatusCell>,
    mut events: broadcast::Receiver<SyncEvent>,
    mut connectivity: watch::Receiver<crate::client::sync::ConnectivityState>,
) {
    loop {
        tokio::select! {
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connectivity.borrow_and_update();
                if let (Some(db), Some(at)) = (&database, state.last_online) {
                    if let Err(e) = db.set_last_online(at).await {
                        tracing::warn!("Failed to persist last online time: {}", e);
                    }
                }
            }
            event = events.recv() => match event {
                Ok(SyncEvent::SyncCompleted(report)) => {
                    if let Some(db) = &database {
                        if let Err(e) = db.set_last_sync(report.finished_at).await {
                            tracing::warn!("Failed to persist last sync time: {}", e);
                        }
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::debug!("Status pump skipped {} event(s)", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }

        if let Err(e) = refresh(&*store, &monitor, &status).await {
            tracing::warn!("Failed to refresh sync status: {}", e);
        }
    }
}
