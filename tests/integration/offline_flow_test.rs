//! Offline manager flows: queue while offline, drain on reconnect

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use wolfpack_sync::client::error::OfflineError;
use wolfpack_sync::client::offline::{ActionStore, MemoryActionStore};
use wolfpack_sync::client::{DrainOutcome, OfflineManager};
use wolfpack_sync::shared::{ActionKind, FailurePolicy, SyncTrigger};

use crate::common::*;

async fn manager_with(
    transport: Arc<ScriptedTransport>,
    policy: FailurePolicy,
    online: bool,
) -> OfflineManager {
    let store: Arc<dyn ActionStore> = Arc::new(MemoryActionStore::new());
    assert_ok!(OfflineManager::new(&test_config(policy), store, transport, online).await)
}

#[tokio::test]
async fn test_order_queued_offline_syncs_on_reconnect() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport.clone(), FailurePolicy::default(), false).await;

    let id = assert_ok!(manager.create_order(&order("wings", 2, 18.0)).await);

    let status = manager.status();
    assert!(!status.is_online);
    assert!(status.sync_pending);
    assert_eq!(status.sync_items, 1);
    assert!(transport.calls().is_empty());

    manager.set_online(true);
    let status = wait_for_status(&manager, |s| s.is_online && s.sync_items == 0).await;

    assert!(!status.sync_pending);
    assert_eq!(transport.calls(), vec![id]);
    assert!(manager.last_online().is_some());
}

#[tokio::test]
async fn test_drain_preserves_enqueue_order() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport.clone(), FailurePolicy::default(), false).await;

    let a = assert_ok!(manager.create_order(&order("nachos", 1, 11.5)).await);
    let b = assert_ok!(manager.submit_feedback(&feedback(5, "great set tonight")).await);
    let c = assert_ok!(manager.update_profile(&vibe("locked in")).await);

    let pending: Vec<_> = assert_ok!(manager.pending_items().await).into_iter().map(|a| a.id).collect();
    assert_eq!(pending, vec![a, b, c]);

    manager.set_online(true);
    wait_for_status(&manager, |s| s.sync_items == 0).await;

    assert_eq!(transport.calls(), vec![a, b, c]);
    assert_eq!(
        transport.call_kinds(),
        vec![ActionKind::Order, ActionKind::Feedback, ActionKind::ProfileUpdate]
    );
}

#[tokio::test]
async fn test_concurrent_triggers_never_overlap() {
    let transport = Arc::new(ScriptedTransport::slow(Duration::from_millis(40)));
    let manager = manager_with(transport.clone(), FailurePolicy::default(), false).await;

    for qty in 1..=3 {
        assert_ok!(manager.create_order(&order("fries", qty, 4.0 * qty as f64)).await);
    }

    manager.set_online(true);
    let (first, second) = tokio::join!(manager.sync_now(), manager.sync_now());
    assert_ok!(first);
    assert_ok!(second);
    wait_for_status(&manager, |s| s.sync_items == 0).await;

    assert_eq!(transport.max_in_flight(), 1);
    let mut calls = transport.calls();
    calls.sort();
    calls.dedup();
    assert_eq!(calls.len(), 3, "each action is submitted exactly once");
}

#[tokio::test]
async fn test_sync_now_while_offline_does_nothing() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport.clone(), FailurePolicy::default(), false).await;
    assert_ok!(manager.create_order(&order("wings", 1, 9.0)).await);

    assert_matches!(assert_ok!(manager.sync_now().await), DrainOutcome::Offline);
    assert_eq!(manager.status().sync_items, 1);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_failed_kind_blocks_only_its_own_kind() {
    let transport = Arc::new(ScriptedTransport::new().fail_kind(ActionKind::Order));
    let manager = manager_with(transport.clone(), FailurePolicy::BlockSameKind, false).await;

    let first_order = assert_ok!(manager.create_order(&order("wings", 2, 18.0)).await);
    let note = assert_ok!(manager.submit_feedback(&feedback(4, "loud but fun")).await);
    let second_order = assert_ok!(manager.create_order(&order("tacos", 3, 15.0)).await);

    let mut events = manager.subscribe_events();
    manager.set_online(true);
    let report = next_report(&mut events).await;

    assert_eq!(report.trigger, SyncTrigger::Reconnect);
    assert_eq!((report.synced, report.failed, report.skipped), (1, 1, 1));
    assert_eq!(report.remaining, 2);
    // The blocked order was never sent.
    assert_eq!(transport.calls(), vec![first_order, note]);

    let pending = assert_ok!(manager.pending_items().await);
    assert_eq!(pending.iter().map(|a| a.id).collect::<Vec<_>>(), vec![first_order, second_order]);
    assert_eq!(pending[0].attempts, 1);
    assert_contains!(pending[0].last_error.clone().unwrap_or_default(), "503");
    assert_eq!(pending[1].attempts, 0);
}

#[tokio::test]
async fn test_block_all_stops_at_first_failure() {
    let transport = Arc::new(ScriptedTransport::new().fail_kind(ActionKind::Order));
    let manager = manager_with(transport.clone(), FailurePolicy::BlockAll, false).await;

    let first_order = assert_ok!(manager.create_order(&order("wings", 2, 18.0)).await);
    assert_ok!(manager.submit_feedback(&feedback(4, "loud but fun")).await);
    assert_ok!(manager.update_profile(&vibe("dancing")).await);

    let mut events = manager.subscribe_events();
    manager.set_online(true);
    let report = next_report(&mut events).await;

    assert_eq!((report.synced, report.failed, report.skipped), (0, 1, 2));
    assert_eq!(report.remaining, 3);
    assert_eq!(transport.calls(), vec![first_order]);
}

#[tokio::test]
async fn test_recovered_server_drains_the_backlog() {
    let transport = Arc::new(ScriptedTransport::new().fail_kind(ActionKind::Feedback));
    let manager = manager_with(transport.clone(), FailurePolicy::BlockSameKind, false).await;

    assert_ok!(manager.submit_feedback(&feedback(2, "cold wings")).await);
    let mut events = manager.subscribe_events();
    manager.set_online(true);
    assert_eq!(next_report(&mut events).await.remaining, 1);

    transport.recover();
    let outcome = assert_ok!(manager.sync_now().await);
    let report = outcome.report().cloned();
    assert_matches!(report, Some(r) if r.synced == 1 && r.remaining == 0);
    assert_eq!(manager.status().sync_items, 0);
}

#[tokio::test]
async fn test_rejected_action_stays_until_evicted() {
    let transport = Arc::new(ScriptedTransport::new().reject_kind(ActionKind::Order));
    let manager = manager_with(transport.clone(), FailurePolicy::default(), false).await;

    let id = assert_ok!(manager.create_order(&order("mystery", 1, 0.0)).await);
    let mut events = manager.subscribe_events();
    manager.set_online(true);
    let report = next_report(&mut events).await;
    assert_eq!(report.failed, 1);
    assert_eq!(manager.status().sync_items, 1);

    assert!(assert_ok!(manager.evict(&id).await));
    assert!(!assert_ok!(manager.evict(&id).await));
    assert_eq!(manager.status().sync_items, 0);
}

#[tokio::test]
async fn test_invalid_actions_never_enter_the_queue() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport, FailurePolicy::default(), false).await;

    assert_err!(manager.create_order(&order("wings", 0, 9.0)).await, OfflineError::Validation(_));
    assert_err!(manager.submit_feedback(&feedback(9, "off the charts")).await, OfflineError::Validation(_));
    assert_err!(
        manager.update_profile(&Default::default()).await,
        OfflineError::Validation(_)
    );
    assert_eq!(manager.status().sync_items, 0);
}

#[tokio::test]
async fn test_going_offline_is_reported() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport, FailurePolicy::default(), true).await;
    assert!(manager.is_online());

    assert!(manager.set_online(false));
    let status = wait_for_status(&manager, |s| !s.is_online).await;
    assert!(status.last_online.is_some());
    assert!(!manager.set_online(false));
}

#[tokio::test]
async fn test_periodic_registration_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager_with(transport, FailurePolicy::default(), true).await;

    assert!(manager.register_periodic_update().await);
    assert!(!manager.register_periodic_update().await);
    manager.shutdown().await;
}
