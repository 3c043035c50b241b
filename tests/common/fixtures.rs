//! Payload fixtures and channel helpers

use std::time::Duration;

use tokio::sync::broadcast;
use wolfpack_sync::client::OfflineManager;
use wolfpack_sync::shared::config::AppConfig;
use wolfpack_sync::shared::{
    FailurePolicy, FeedbackSubmission, OrderDraft, OrderLine, ProfileChanges, SyncEvent, SyncReport,
};
use wolfpack_sync::client::SyncStatus;

/// How long a test waits on a channel before failing
pub const WAIT: Duration = Duration::from_secs(5);

pub fn test_config(policy: FailurePolicy) -> AppConfig {
    AppConfig::builder()
        .failure_policy(policy)
        .sync_interval_secs(3600)
        .build()
        .expect("test config is valid")
}

pub fn order(item: &str, qty: u32, total: f64) -> OrderDraft {
    OrderDraft {
        items: vec![OrderLine {
            id: item.to_string(),
            qty,
        }],
        total,
        table_number: Some(12),
        notes: None,
    }
}

pub fn feedback(rating: u8, message: &str) -> FeedbackSubmission {
    FeedbackSubmission {
        rating,
        message: message.to_string(),
        category: None,
    }
}

pub fn vibe(status: &str) -> ProfileChanges {
    ProfileChanges {
        vibe_status: Some(status.to_string()),
        ..ProfileChanges::default()
    }
}

/// Wait until the manager's status satisfies `predicate`
pub async fn wait_for_status<F>(manager: &OfflineManager, predicate: F) -> SyncStatus
where
    F: Fn(&SyncStatus) -> bool,
{
    let mut rx = manager.subscribe();
    let result = tokio::time::timeout(WAIT, async {
        loop {
            let status = *rx.borrow_and_update();
            if predicate(&status) {
                return status;
            }
            if rx.changed().await.is_err() {
                panic!("status channel closed");
            }
        }
    })
    .await;
    match result {
        Ok(status) => status,
        Err(_) => panic!("status never matched; last was {:?}", manager.status()),
    }
}

/// Wait for the next `sync-completed` event
pub async fn next_report(events: &mut broadcast::Receiver<SyncEvent>) -> SyncReport {
    let result = tokio::time::timeout(WAIT, async {
        loop {
            match events.recv().await {
                Ok(SyncEvent::SyncCompleted(report)) => return report,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await;
    result.expect("no sync-completed event")
}
