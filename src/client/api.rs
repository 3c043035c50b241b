//! # Remote API Client
//!
//! Submits queued actions to the Wolf Pack API. One endpoint per action kind:
//!
//! | kind             | request               |
//! |------------------|-----------------------|
//! | `order`          | `POST /api/orders`    |
//! | `profile_update` | `PATCH /api/profile`  |
//! | `feedback`       | `POST /api/feedback`  |
//!
//! Every request carries `Idempotency-Key: <action id>` so a replay after a
//! crash between server success and local removal is applied once.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use crate::client::config::Config;
use crate::client::error::ApiError;
use crate::shared::{ActionKind, PendingAction};

/// Header carrying the action id
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Transport used by the sync coordinator
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Submit one action; `Ok` only when the server confirmed it
    async fn submit(&self, action: &PendingAction) -> Result<(), ApiError>;
}

/// HTTP method and path for an action kind
pub fn endpoint(kind: ActionKind) -> (Method, &'static str) {
    match kind {
        ActionKind::Order => (Method::POST, "/api/orders"),
        ActionKind::ProfileUpdate => (Method::PATCH, "/api/profile"),
        ActionKind::Feedback => (Method::POST, "/api/feedback"),
    }
}

/// reqwest-backed [`RemoteApi`]
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    config: Config,
}

impl HttpRemoteApi {
    /// Build a client with the configured request timeout
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.app().request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn submit(&self, action: &PendingAction) -> Result<(), ApiError> {
        let (method, path) = endpoint(action.kind);
        let url = self.config.api_url(path);

        let mut request = self
            .client
            .request(method, &url)
            .header(IDEMPOTENCY_HEADER, action.id.to_string())
            .json(&action.payload);
        if let Some(token) = self.config.get_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("{} {} accepted action {}", path, status, action.id);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ApiError::Rejected(action.id, body));
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
