//! Scripted remote API
//!
//! Records every submission, fails the kinds it is told to fail, and can
//! hold each request open to widen race windows.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;
use wolfpack_sync::client::api::RemoteApi;
use wolfpack_sync::client::error::ApiError;
use wolfpack_sync::shared::{ActionKind, PendingAction};

#[derive(Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<(Uuid, ActionKind)>>,
    failing: Mutex<HashSet<ActionKind>>,
    rejecting: Mutex<HashSet<ActionKind>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every submission open for `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Answer submissions of `kind` with a 503
    pub fn fail_kind(self, kind: ActionKind) -> Self {
        self.failing.lock().unwrap().insert(kind);
        self
    }

    /// Answer submissions of `kind` with a 422
    pub fn reject_kind(self, kind: ActionKind) -> Self {
        self.rejecting.lock().unwrap().insert(kind);
        self
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
        self.rejecting.lock().unwrap().clear();
    }

    /// Action ids in submission order, failures included
    pub fn calls(&self) -> Vec<Uuid> {
        self.calls.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn call_kinds(&self) -> Vec<ActionKind> {
        self.calls.lock().unwrap().iter().map(|(_, kind)| *kind).collect()
    }

    /// Highest number of submissions seen in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteApi for ScriptedTransport {
    async fn submit(&self, action: &PendingAction) -> Result<(), ApiError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push((action.id, action.kind));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.rejecting.lock().unwrap().contains(&action.kind) {
            return Err(ApiError::Rejected(action.id, "invalid".to_string()));
        }
        if self.failing.lock().unwrap().contains(&action.kind) {
            return Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}
