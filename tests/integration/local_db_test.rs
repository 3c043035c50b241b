//! SQLite queue persistence across restarts

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wolfpack_sync::client::error::StoreError;
use wolfpack_sync::client::local_db::LocalDatabase;
use wolfpack_sync::client::offline::ActionStore;
use wolfpack_sync::client::OfflineManager;
use wolfpack_sync::shared::{ActionKind, FailurePolicy};

use crate::common::*;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("nested").join("wolfpack.db")
}

#[tokio::test]
async fn test_queue_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let (first, second) = {
        let db = assert_ok!(LocalDatabase::open(db_path(&dir)).await);
        let first = assert_ok!(db.enqueue(ActionKind::Order, json!({"items": [{"id": "wings", "qty": 1}]})).await);
        let second = assert_ok!(db.enqueue(ActionKind::Feedback, json!({"rating": 5, "message": "ok"})).await);
        assert_ok!(db.record_failure(&first.id, "server returned HTTP 503").await);
        db.pool().close().await;
        (first, second)
    };

    let db = assert_ok!(LocalDatabase::open(db_path(&dir)).await);
    let pending = assert_ok!(db.dequeue_all().await);

    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, first.id);
    assert_eq!(pending[0].payload, first.payload);
    assert_eq!(pending[0].attempts, 1);
    assert_eq!(pending[0].last_error.as_deref(), Some("server returned HTTP 503"));
    assert_eq!(pending[1].id, second.id);
    assert_eq!(pending[1].kind, ActionKind::Feedback);
}

#[tokio::test]
async fn test_rejects_bad_payloads() {
    let db = assert_ok!(LocalDatabase::in_memory().await).with_max_payload_bytes(64);

    assert_err!(db.enqueue(ActionKind::Order, json!(["not", "an", "object"])).await, StoreError::PayloadNotObject);
    let long = "x".repeat(128);
    assert_err!(
        db.enqueue(ActionKind::Feedback, json!({"message": long})).await,
        StoreError::PayloadTooLarge { .. }
    );
    assert_eq!(assert_ok!(db.count().await), 0);
}

#[tokio::test]
async fn test_manager_restores_backlog_and_last_online() {
    let dir = TempDir::new().unwrap();
    let config = test_config(FailurePolicy::default());

    let queued = {
        let db = assert_ok!(LocalDatabase::open(db_path(&dir)).await);
        let transport = Arc::new(ScriptedTransport::new());
        let manager = assert_ok!(OfflineManager::with_database(&config, db.clone(), transport, true).await);
        assert!(manager.last_online().is_some());

        manager.set_online(false);
        wait_for_status(&manager, |s| !s.is_online).await;
        let id = assert_ok!(manager.update_profile(&vibe("back soon")).await);
        manager.shutdown().await;
        db.pool().close().await;
        id
    };

    let db = assert_ok!(LocalDatabase::open(db_path(&dir)).await);
    let persisted = assert_ok!(db.last_online().await);
    assert!(persisted.is_some());

    let transport = Arc::new(ScriptedTransport::new());
    let manager = assert_ok!(OfflineManager::with_database(&config, db, transport.clone(), false).await);

    let status = manager.status();
    assert_eq!(status.sync_items, 1);
    assert_eq!(status.last_online, persisted);

    manager.set_online(true);
    wait_for_status(&manager, |s| s.sync_items == 0).await;
    assert_eq!(transport.calls(), vec![queued]);
}

#[tokio::test]
async fn test_undecodable_row_does_not_block_the_queue() {
    let dir = TempDir::new().unwrap();
    let db = assert_ok!(LocalDatabase::open(db_path(&dir)).await);
    sqlx::query("INSERT INTO pending_actions (id, kind, payload, created_at) VALUES ('not-a-uuid', 'order', '{}', ?)")
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(db.pool())
        .await
        .unwrap();

    let transport = Arc::new(ScriptedTransport::new());
    let manager = assert_ok!(
        OfflineManager::with_database(&test_config(FailurePolicy::default()), db.clone(), transport.clone(), false).await
    );
    let queued = assert_ok!(manager.submit_feedback(&feedback(5, "still works")).await);

    let pending = assert_ok!(manager.pending_items().await);
    assert_eq!(pending.iter().map(|a| a.id).collect::<Vec<_>>(), vec![queued]);

    manager.set_online(true);
    wait_for_status(&manager, |s| s.sync_items == 0).await;
    assert_eq!(transport.calls(), vec![queued]);

    let quarantined = assert_ok!(db.quarantined_actions().await);
    assert_eq!(quarantined.len(), 1);
    assert_eq!(quarantined[0].id, "not-a-uuid");
}
