//! Queued Action Types
//!
//! Actions a patron can take while offline. The client stores them as
//! [`PendingAction`]s and the backend receives their payloads verbatim.
//!
//! The typed payloads ([`OrderDraft`], [`ProfileChanges`], [`FeedbackSubmission`])
//! are validated on the client before they enter the queue; the queue itself
//! only ever sees an opaque JSON object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Kind of a queued action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Menu order creation
    Order,
    /// Wolf Pack member profile edit
    ProfileUpdate,
    /// Feedback form submission
    Feedback,
}

impl ActionKind {
    /// All kinds, in declaration order
    pub const ALL: [ActionKind; 3] = [ActionKind::Order, ActionKind::ProfileUpdate, ActionKind::Feedback];

    /// Stable name used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Order => "order",
            ActionKind::ProfileUpdate => "profile_update",
            ActionKind::Feedback => "feedback",
        }
    }

    /// Parse a persisted kind name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user action waiting to be synced
///
/// The payload is never mutated after creation. `seq` is assigned by the
/// store and defines drain order; `attempts` and `last_error` are store
/// bookkeeping updated on failed submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingAction {
    /// Generated action id, also sent as the idempotency key
    pub id: Uuid,
    /// Action kind
    pub kind: ActionKind,
    /// Opaque JSON payload (always an object)
    pub payload: serde_json::Value,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Insertion sequence within the store
    pub seq: i64,
    /// Failed submission attempts so far
    pub attempts: u32,
    /// Error from the most recent failed attempt
    pub last_error: Option<String>,
}

impl PendingAction {
    /// Create a fresh action with a generated id
    pub fn new(kind: ActionKind, payload: serde_json::Value, seq: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            timestamp: Utc::now(),
            seq,
            attempts: 0,
            last_error: None,
        }
    }
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Menu item id
    pub id: String,
    /// Quantity ordered
    pub qty: u32,
}

/// An order created from the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderDraft {
    /// Check the order is submittable
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.items.is_empty() {
            return Err(SharedError::validation("items", "order must contain at least one item"));
        }
        if let Some(line) = self.items.iter().find(|line| line.qty == 0) {
            return Err(SharedError::validation(
                "items",
                format!("item '{}' has zero quantity", line.id),
            ));
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(SharedError::validation("total", "total must be a non-negative amount"));
        }
        Ok(())
    }
}

/// Partial edit of a member profile; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe_status: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.favorite_team.is_none()
            && self.vibe_status.is_none()
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.is_empty() {
            return Err(SharedError::validation("profile", "no fields to update"));
        }
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(SharedError::validation("display_name", "display name cannot be blank"));
            }
        }
        Ok(())
    }
}

/// Feedback left by a patron
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackSubmission {
    /// Star rating, 1 to 5
    pub rating: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FeedbackSubmission {
    pub fn validate(&self) -> Result<(), SharedError> {
        if !(1..=5).contains(&self.rating) {
            return Err(SharedError::validation("rating", "rating must be between 1 and 5"));
        }
        if self.message.trim().is_empty() {
            return Err(SharedError::validation("message", "feedback message cannot be empty"));
        }
        Ok(())
    }
}

/// Body returned by the backend for an accepted action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionReceipt {
    /// The action id the server recorded
    pub action_id: Uuid,
    /// `true` when the server had already applied this action id
    pub duplicate: bool,
}
