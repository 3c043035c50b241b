//! # Network Monitor
//!
//! Single source of truth for online/offline state.
//!
//! The platform (or a [`ConnectivityProbe`] loop) reports what it sees via
//! [`ConnectivityMonitor::set_online`]. The monitor only publishes when the
//! state actually flips, so a burst of "online" reports produces exactly one
//! `connectivity-changed` event and one watch notification.
//!
//! Detection is best-effort: a probe can report online while the network is
//! unusable. The sync coordinator copes with that by leaving failed actions
//! queued.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::config::Config;
use crate::client::error::ApiError;
use crate::client::sync::{broadcast_event, SyncEventBroadcast};
use crate::shared::SyncEvent;

/// Cached connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub is_online: bool,
    /// Last moment the device was known to be online
    pub last_online: Option<DateTime<Utc>>,
}

/// Tracks connectivity and notifies on transitions
#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: watch::Sender<ConnectivityState>,
    events: SyncEventBroadcast,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool, events: SyncEventBroadcast) -> Self {
        let state = ConnectivityState {
            is_online: initially_online,
            last_online: initially_online.then(Utc::now),
        };
        let (state, _) = watch::channel(state);
        Self { state, events }
    }

    /// Current state, read without waiting
    pub fn status(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state.borrow().is_online
    }

    /// Receiver that wakes on every online/offline flip
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    /// Seed `last_online` from persisted metadata when nothing newer is known
    pub fn restore_last_online(&self, at: DateTime<Utc>) {
        self.state.send_if_modified(|state| match state.last_online {
            Some(current) if current >= at => false,
            _ => {
                state.last_online = Some(at);
                false
            }
        });
    }

    /// Record a connectivity observation
    ///
    /// Returns `true` when the observation flipped the state.
    pub fn set_online(&self, online: bool) -> bool {
        let now = Utc::now();
        let flipped = self.state.send_if_modified(|state| {
            let flipped = state.is_online != online;
            // Going offline stamps the last moment we were online too.
            if online || flipped {
                state.last_online = Some(now);
            }
            state.is_online = online;
            flipped
        });

        if flipped {
            if online {
                tracing::info!("Connectivity restored");
            } else {
                tracing::warn!("Connectivity lost");
            }
            broadcast_event(&self.events, SyncEvent::connectivity(online));
        }
        flipped
    }
}

/// Something that can tell whether the API is reachable
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn check(&self) -> bool;
}

/// Probe that polls the API server's health endpoint
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.app().request_timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.api_url("/health"),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                false
            }
        }
    }
}

/// Poll `probe` every `every` and feed the results into `monitor`
pub fn spawn_probe(
    monitor: Arc<ConnectivityMonitor>,
    probe: Arc<dyn ConnectivityProbe>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let online = probe.check().await;
            monitor.set_online(online);
        }
    })
}
