//! # Sync Scheduler
//!
//! Decides whether a periodic tick should start a drain. After a cycle with
//! failures the scheduler holds periodic drains back according to the
//! backoff strategy; a clean cycle or a reconnect clears the backoff.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::client::offline::retry::BackoffStrategy;
use crate::shared::SyncReport;

/// Synchronization scheduler
#[derive(Debug)]
pub struct SyncScheduler {
    /// Period of the timer trigger
    interval: Duration,
    backoff: BackoffStrategy,
    state: RwLock<ScheduleState>,
}

#[derive(Debug, Default)]
struct ScheduleState {
    is_active: bool,
    last_cycle: Option<Instant>,
    consecutive_failures: u32,
    next_allowed: Option<Instant>,
}

impl SyncScheduler {
    /// Create a new sync scheduler
    pub fn new(interval: Duration, backoff: BackoffStrategy) -> Self {
        Self {
            interval,
            backoff,
            state: RwLock::new(ScheduleState::default()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the scheduler
    pub async fn start(&self) {
        self.state.write().await.is_active = true;
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        self.state.write().await.is_active = false;
    }

    pub async fn is_active(&self) -> bool {
        self.state.read().await.is_active
    }

    /// Check if a periodic tick should drain now
    pub async fn should_sync(&self) -> bool {
        let state = self.state.read().await;
        if !state.is_active {
            return false;
        }
        match state.next_allowed {
            Some(at) => Instant::now() >= at,
            None => true,
        }
    }

    /// Record the outcome of a finished cycle
    pub async fn record_cycle(&self, report: &SyncReport) {
        let mut state = self.state.write().await;
        let now = Instant::now();
        state.last_cycle = Some(now);

        if report.failed > 0 {
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            let delay = self.backoff.delay(state.consecutive_failures);
            state.next_allowed = Some(now + delay);
            tracing::debug!(
                "Backing off periodic sync for {:?} after {} failing cycle(s)",
                delay,
                state.consecutive_failures
            );
        } else {
            state.consecutive_failures = 0;
            state.next_allowed = None;
        }
    }

    /// Forget accumulated backoff (connectivity changed)
    pub async fn reset_backoff(&self) {
        let mut state = self.state.write().await;
        state.consecutive_failures = 0;
        state.next_allowed = None;
    }

    pub async fn consecutive_failures(&self) -> u32 {
        self.state.read().await.consecutive_failures
    }

    /// Get time until a periodic drain is allowed again
    pub async fn time_until_next_sync(&self) -> Duration {
        let state = self.state.read().await;
        state
            .next_allowed
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }
}
