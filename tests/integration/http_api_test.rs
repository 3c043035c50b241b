//! HTTP transport against a mock API server

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wolfpack_sync::client::api::{HttpRemoteApi, RemoteApi, IDEMPOTENCY_HEADER};
use wolfpack_sync::client::error::ApiError;
use wolfpack_sync::client::offline::{ActionStore, MemoryActionStore};
use wolfpack_sync::client::sync::{ConnectivityProbe, HttpProbe};
use wolfpack_sync::client::{Config, OfflineManager};
use wolfpack_sync::shared::{ActionKind, AppConfig, FailurePolicy, PendingAction};

use crate::common::*;

fn config_for(server: &MockServer) -> Config {
    assert_ok!(Config::with_builder(AppConfig::builder().server_url(server.uri())))
}

/// Config pointing at a loopback port with nothing listening on it
fn dead_config() -> Config {
    let listener = assert_ok!(std::net::TcpListener::bind("127.0.0.1:0"));
    let addr = assert_ok!(listener.local_addr());
    drop(listener);
    assert_ok!(Config::with_builder(AppConfig::builder().server_url(format!("http://{addr}"))))
}

fn action(kind: ActionKind, payload: serde_json::Value) -> PendingAction {
    PendingAction::new(kind, payload, 1)
}

#[tokio::test]
async fn test_order_is_posted_with_idempotency_key() {
    let server = MockServer::start().await;
    let order = action(ActionKind::Order, json!({"items": [{"id": "wings", "qty": 2}], "total": 18.0}));

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header(IDEMPOTENCY_HEADER, order.id.to_string().as_str()))
        .and(body_json(&order.payload))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = assert_ok!(HttpRemoteApi::new(config_for(&server)));
    assert_ok!(api.submit(&order).await);
}

#[tokio::test]
async fn test_profile_update_is_patched_with_token() {
    let server = MockServer::start().await;
    let update = action(ActionKind::ProfileUpdate, json!({"vibe_status": "chilling"}));

    Mock::given(method("PATCH"))
        .and(path("/api/profile"))
        .and(header("authorization", "Bearer member-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.set_token(Some("member-token".to_string()));
    let api = assert_ok!(HttpRemoteApi::new(config));
    assert_ok!(api.submit(&update).await);
}

#[tokio::test]
async fn test_unprocessable_is_a_rejection() {
    let server = MockServer::start().await;
    let feedback = action(ActionKind::Feedback, json!({"rating": 0, "message": "?"}));

    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(422).set_body_string("rating out of range"))
        .mount(&server)
        .await;

    let api = assert_ok!(HttpRemoteApi::new(config_for(&server)));
    let err = api.submit(&feedback).await.unwrap_err();
    assert_matches!(err, ApiError::Rejected(id, body) if id == feedback.id && body == "rating out of range");
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&server)
        .await;

    let api = assert_ok!(HttpRemoteApi::new(config_for(&server)));
    let err = api.submit(&action(ActionKind::Order, json!({"items": []}))).await.unwrap_err();
    assert_matches!(err, ApiError::Status { status: 503, .. });
    assert!(!err.is_network());
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let api = assert_ok!(HttpRemoteApi::new(dead_config()));
    let err = api.submit(&action(ActionKind::Feedback, json!({"rating": 5}))).await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let probe = assert_ok!(HttpProbe::new(&config_for(&server)));
    assert!(probe.check().await);

    let probe = assert_ok!(HttpProbe::new(&dead_config()));
    assert!(!probe.check().await);
}

#[tokio::test]
async fn test_offline_queue_replays_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(assert_ok!(HttpRemoteApi::new(config_for(&server))));
    let store: Arc<dyn ActionStore> = Arc::new(MemoryActionStore::new());
    let manager = assert_ok!(
        OfflineManager::new(&test_config(FailurePolicy::default()), store, api, false).await
    );

    assert_ok!(manager.create_order(&order("wings", 2, 18.0)).await);
    assert_ok!(manager.submit_feedback(&feedback(5, "best wings in town")).await);

    manager.set_online(true);
    wait_for_status(&manager, |s| s.sync_items == 0).await;

    let requests = server.received_requests().await.unwrap_or_default();
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec!["/api/orders", "/api/feedback"]);
}
