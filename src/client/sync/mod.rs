//! # Sync
//!
//! Moves queued actions from the local store to the remote API.
//!
//! ## Architecture
//!
//! - **Network Monitor**: online/offline state, flip notifications
//! - **Coordinator**: one drain of the queue, at most one at a time
//! - **Background**: the task that turns reconnects, timer ticks and manual
//!   nudges into drains
//! - **Scheduler**: backoff for the periodic timer after failing cycles
//! - **Sync State**: the derived status UI code renders
//! - **Metrics**: cumulative drain counters
//!
//! Everything publishes [`SyncEvent`]s on one broadcast channel created with
//! [`event_channel`] and injected into each component.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wolfpack_sync::client::api::HttpRemoteApi;
//! use wolfpack_sync::client::config::Config;
//! use wolfpack_sync::client::offline::queue::MemoryActionStore;
//! use wolfpack_sync::client::sync::{event_channel, ConnectivityMonitor, SyncCoordinator};
//! use wolfpack_sync::shared::{FailurePolicy, SyncTrigger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let events = event_channel();
//! let monitor = Arc::new(ConnectivityMonitor::new(true, events.clone()));
//! let coordinator = SyncCoordinator::new(
//!     Arc::new(MemoryActionStore::new()),
//!     Arc::new(HttpRemoteApi::new(Config::from_env()?)?),
//!     monitor,
//!     FailurePolicy::default(),
//!     events,
//! );
//! let outcome = coordinator.drain(SyncTrigger::Manual).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod coordinator;
pub mod metrics;
pub mod network_monitor;
pub mod scheduler;
pub mod sync_state;

pub use background::SyncService;
pub use coordinator::{DrainOutcome, SyncCoordinator};
pub use metrics::SyncMetrics;
pub use network_monitor::{ConnectivityMonitor, ConnectivityProbe, ConnectivityState, HttpProbe};
pub use scheduler::SyncScheduler;
pub use sync_state::{SyncStatus, SyncStatusCell};

use tokio::sync::broadcast;

use crate::shared::SyncEvent;

/// Buffered events per subscriber before the slowest one starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Sender half of the sync event channel
pub type SyncEventBroadcast = broadcast::Sender<SyncEvent>;

/// Create the event channel shared by monitor, coordinator and facade
pub fn event_channel() -> SyncEventBroadcast {
    let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    tx
}

/// Broadcast an event to all subscribers
///
/// Returns the number of subscribers that received it. Having no
/// subscribers is not an error.
pub fn broadcast_event(tx: &SyncEventBroadcast, event: SyncEvent) -> usize {
    let name = event.name();
    match tx.send(event) {
        Ok(count) => {
            tracing::trace!("Broadcast {} to {} subscriber(s)", name, count);
            count
        }
        Err(_) => {
            tracing::trace!("No subscribers for {}", name);
            0
        }
    }
}
