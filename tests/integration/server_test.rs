//! Client against the real backend on a loopback port

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wolfpack_sync::backend::{create_app_with_state, AppState};
use wolfpack_sync::client::api::{HttpRemoteApi, RemoteApi};
use wolfpack_sync::client::error::ApiError;
use wolfpack_sync::client::feed::{EventFeedAdapter, HttpFeedSource};
use wolfpack_sync::client::offline::{ActionStore, MemoryActionStore};
use wolfpack_sync::client::sync::{ConnectivityProbe, HttpProbe};
use wolfpack_sync::client::{Config, OfflineManager};
use wolfpack_sync::shared::{ActionKind, AppConfig, FailurePolicy, PendingAction};

use crate::common::*;

async fn spawn_server(state: AppState) -> Config {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app_with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = Config::with_builder(AppConfig::builder().server_url(format!("http://{addr}"))).unwrap();
    config.set_token(Some("member-9".to_string()));
    config
}

#[tokio::test]
async fn test_queued_actions_reach_the_server_once() {
    let state = AppState::default();
    let config = spawn_server(state.clone()).await;
    assert!(HttpProbe::new(&config).unwrap().check().await);

    let api = Arc::new(HttpRemoteApi::new(config).unwrap());
    let store: Arc<dyn ActionStore> = Arc::new(MemoryActionStore::new());
    let manager = assert_ok!(OfflineManager::new(&test_config(FailurePolicy::default()), store, api, false).await);

    assert_ok!(manager.create_order(&order("wings", 2, 18.0)).await);
    assert_ok!(manager.update_profile(&vibe("on the dance floor")).await);
    assert_ok!(manager.submit_feedback(&feedback(5, "great DJ")).await);

    manager.set_online(true);
    wait_for_status(&manager, |s| s.sync_items == 0).await;

    let ledger = state.ledger.read().await;
    assert_eq!(ledger.processed_count(), 3);
    assert_eq!(ledger.orders.len(), 1);
    assert_eq!(ledger.feedback.len(), 1);
    assert_eq!(ledger.profiles["member-9"].vibe_status.as_deref(), Some("on the dance floor"));
}

#[tokio::test]
async fn test_replayed_submission_is_not_applied_twice() {
    let state = AppState::default();
    let api = HttpRemoteApi::new(spawn_server(state.clone()).await).unwrap();
    let action = PendingAction::new(
        ActionKind::Order,
        json!({"items": [{"id": "nachos", "qty": 1}], "total": 11.5}),
        1,
    );

    // A crash between server success and local removal replays the action.
    assert_ok!(api.submit(&action).await);
    assert_ok!(api.submit(&action).await);

    let ledger = state.ledger.read().await;
    assert_eq!(ledger.orders.len(), 1);
    assert!(ledger.is_processed(&action.id));
}

#[tokio::test]
async fn test_server_validation_is_a_rejection() {
    let api = HttpRemoteApi::new(spawn_server(AppState::default()).await).unwrap();
    let action = PendingAction::new(ActionKind::Feedback, json!({"rating": 7, "message": "??"}), 1);

    let err = api.submit(&action).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(id, _) if id == action.id));
}

#[tokio::test]
async fn test_feed_loads_from_seeded_server() {
    let config = spawn_server(AppState::seeded()).await;
    let adapter = EventFeedAdapter::new(Arc::new(HttpFeedSource::new(config).unwrap()));

    let items = adapter.load(20).await.unwrap();
    assert!(!items.is_empty());
    assert!(items.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));
}
