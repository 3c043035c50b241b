/**
 * Action Handlers
 *
 * Handlers for the three queued action kinds:
 * - `POST /api/orders` - place an order
 * - `PATCH /api/profile` - merge profile changes
 * - `POST /api/feedback` - leave feedback
 *
 * # Idempotency
 *
 * Each request must carry `Idempotency-Key: <action id>`. The first
 * submission of an id is validated and applied (201 Created). Any later
 * submission of the same id is acknowledged with 200 OK and
 * `duplicate: true` and changes nothing.
 *
 * # Identity
 *
 * The bearer token, when present, names the member. Requests without one
 * are recorded for `anonymous`.
 */

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::SharedLedger;
use crate::client::api::IDEMPOTENCY_HEADER;
use crate::shared::{ActionReceipt, FeedbackSubmission, OrderDraft, ProfileChanges};

/// Member name used when no bearer token is sent
pub const ANONYMOUS_MEMBER: &str = "anonymous";

type ActionResponse = Result<(StatusCode, Json<ActionReceipt>), BackendError>;

/// Read the action id from the `Idempotency-Key` header
pub fn idempotency_key(headers: &HeaderMap) -> Result<Uuid, BackendError> {
    headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or(BackendError::MissingIdempotencyKey)
}

/// Member named by the bearer token
pub fn member(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .unwrap_or(ANONYMOUS_MEMBER)
        .to_string()
}

fn receipt(action_id: Uuid, applied: bool) -> (StatusCode, Json<ActionReceipt>) {
    let status = if applied { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(ActionReceipt { action_id, duplicate: !applied }))
}

async fn replayed(ledger: &SharedLedger, action_id: &Uuid) -> bool {
    let seen = ledger.read().await.is_processed(action_id);
    if seen {
        tracing::info!("Replay of action {} acknowledged without reapplying", action_id);
    }
    seen
}

/// `POST /api/orders`
pub async fn create_order(
    State(ledger): State<SharedLedger>,
    headers: HeaderMap,
    Json(draft): Json<OrderDraft>,
) -> ActionResponse {
    let action_id = idempotency_key(&headers)?;
    if replayed(&ledger, &action_id).await {
        return Ok(receipt(action_id, false));
    }
    draft.validate()?;

    let member = member(&headers);
    let applied = ledger.write().await.record_order(action_id, &member, draft);
    if applied {
        tracing::info!("Order {} accepted for {}", action_id, member);
    }
    Ok(receipt(action_id, applied))
}

/// `PATCH /api/profile`
pub async fn update_profile(
    State(ledger): State<SharedLedger>,
    headers: HeaderMap,
    Json(changes): Json<ProfileChanges>,
) -> ActionResponse {
    let action_id = idempotency_key(&headers)?;
    if replayed(&ledger, &action_id).await {
        return Ok(receipt(action_id, false));
    }
    changes.validate()?;

    let member = member(&headers);
    let applied = ledger.write().await.record_profile(action_id, &member, changes);
    if applied {
        tracing::info!("Profile update {} applied for {}", action_id, member);
    }
    Ok(receipt(action_id, applied))
}

/// `POST /api/feedback`
pub async fn submit_feedback(
    State(ledger): State<SharedLedger>,
    headers: HeaderMap,
    Json(feedback): Json<FeedbackSubmission>,
) -> ActionResponse {
    let action_id = idempotency_key(&headers)?;
    if replayed(&ledger, &action_id).await {
        return Ok(receipt(action_id, false));
    }
    feedback.validate()?;

    let member = member(&headers);
    let applied = ledger.write().await.record_feedback(action_id, &member, feedback);
    if applied {
        tracing::info!("Feedback {} recorded for {}", action_id, member);
    }
    Ok(receipt(action_id, applied))
}
