/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container, holding:
 * - The action ledger (orders, profiles, feedback, processed action ids)
 * - The feed tables served to clients
 *
 * # Idempotency
 *
 * Every accepted action id is remembered in the ledger. A replayed
 * submission (same `Idempotency-Key`) is acknowledged again but applied
 * only once.
 *
 * # Thread Safety
 *
 * - `Arc<RwLock<ActionLedger>>` for concurrent action handling
 * - `Arc<RwLock<FeedTables>>` for feed reads
 */

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::shared::{
    ActionKind, DjEventRow, EventRow, FeedbackSubmission, OrderDraft, ProfileChanges, VideoPostRow,
};

/// Shared ledger handle
pub type SharedLedger = Arc<RwLock<ActionLedger>>;

/// Shared feed handle
pub type SharedFeed = Arc<RwLock<FeedTables>>;

/// Application state
#[derive(Clone, Default)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub feed: SharedFeed,
}

impl AppState {
    /// State with the demo feed loaded
    pub fn seeded() -> Self {
        Self {
            ledger: SharedLedger::default(),
            feed: Arc::new(RwLock::new(FeedTables::seeded())),
        }
    }
}

impl FromRef<AppState> for SharedLedger {
    fn from_ref(state: &AppState) -> Self {
        state.ledger.clone()
    }
}

impl FromRef<AppState> for SharedFeed {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}

/// An accepted order
#[derive(Debug, Clone, Serialize)]
pub struct StoredOrder {
    pub action_id: Uuid,
    pub member: String,
    pub draft: OrderDraft,
    pub received_at: DateTime<Utc>,
}

/// Accepted feedback
#[derive(Debug, Clone, Serialize)]
pub struct StoredFeedback {
    pub action_id: Uuid,
    pub member: String,
    pub feedback: FeedbackSubmission,
    pub received_at: DateTime<Utc>,
}

/// Everything the server has accepted
#[derive(Debug, Default)]
pub struct ActionLedger {
    processed: HashMap<Uuid, ActionKind>,
    pub orders: Vec<StoredOrder>,
    pub profiles: HashMap<String, ProfileChanges>,
    pub feedback: Vec<StoredFeedback>,
}

impl ActionLedger {
    /// Whether an action id was already applied
    pub fn is_processed(&self, action_id: &Uuid) -> bool {
        self.processed.contains_key(action_id)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Apply an order once; returns `false` for a replay
    pub fn record_order(&mut self, action_id: Uuid, member: &str, draft: OrderDraft) -> bool {
        if !self.mark(action_id, ActionKind::Order) {
            return false;
        }
        self.orders.push(StoredOrder {
            action_id,
            member: member.to_string(),
            draft,
            received_at: Utc::now(),
        });
        true
    }

    /// Merge profile changes once; `None` fields keep their current value
    pub fn record_profile(&mut self, action_id: Uuid, member: &str, changes: ProfileChanges) -> bool {
        if !self.mark(action_id, ActionKind::ProfileUpdate) {
            return false;
        }
        let profile = self.profiles.entry(member.to_string()).or_default();
        let ProfileChanges {
            display_name,
            bio,
            avatar_url,
            favorite_team,
            vibe_status,
        } = changes;
        if display_name.is_some() {
            profile.display_name = display_name;
        }
        if bio.is_some() {
            profile.bio = bio;
        }
        if avatar_url.is_some() {
            profile.avatar_url = avatar_url;
        }
        if favorite_team.is_some() {
            profile.favorite_team = favorite_team;
        }
        if vibe_status.is_some() {
            profile.vibe_status = vibe_status;
        }
        true
    }

    pub fn record_feedback(&mut self, action_id: Uuid, member: &str, feedback: FeedbackSubmission) -> bool {
        if !self.mark(action_id, ActionKind::Feedback) {
            return false;
        }
        self.feedback.push(StoredFeedback {
            action_id,
            member: member.to_string(),
            feedback,
            received_at: Utc::now(),
        });
        true
    }

    fn mark(&mut self, action_id: Uuid, kind: ActionKind) -> bool {
        self.processed.insert(action_id, kind).is_none()
    }
}

/// The three tables behind the community feed
#[derive(Debug, Default, Clone)]
pub struct FeedTables {
    pub video_posts: Vec<VideoPostRow>,
    pub events: Vec<EventRow>,
    pub dj_events: Vec<DjEventRow>,
}

impl FeedTables {
    /// A small demo feed
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self {
            video_posts: vec![VideoPostRow {
                id: "video-1".to_string(),
                user_id: "member-1".to_string(),
                author_name: Some("Luna".to_string()),
                caption: Some("Overtime winner, the whole bar lost it".to_string()),
                video_url: Some("https://cdn.example.com/videos/video-1.mp4".to_string()),
                thumbnail_url: None,
                created_at: now - Duration::minutes(5),
                likes_count: 12,
                comments_count: 3,
                shares_count: 1,
            }],
            events: vec![EventRow {
                id: "event-1".to_string(),
                title: "Wolf Pack Trivia".to_string(),
                description: Some("Teams of four, prizes for the top three".to_string()),
                image_url: None,
                created_by: None,
                host_name: None,
                start_time: Some(now + Duration::hours(3)),
                created_at: now - Duration::hours(2),
            }],
            dj_events: vec![DjEventRow {
                id: "dj-1".to_string(),
                dj_id: "dj-ace".to_string(),
                dj_name: Some("DJ Ace".to_string()),
                event_type: "song_vote".to_string(),
                title: "Pick the next track".to_string(),
                description: None,
                created_at: now - Duration::minutes(30),
                participant_count: 8,
            }],
        }
    }

    /// Newest `limit` video posts
    pub fn latest_video_posts(&self, limit: usize) -> Vec<VideoPostRow> {
        latest(&self.video_posts, limit, |row| row.created_at)
    }

    pub fn latest_events(&self, limit: usize) -> Vec<EventRow> {
        latest(&self.events, limit, |row| row.created_at)
    }

    pub fn latest_dj_events(&self, limit: usize) -> Vec<DjEventRow> {
        latest(&self.dj_events, limit, |row| row.created_at)
    }
}

fn latest<T: Clone>(rows: &[T], limit: usize, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows.truncate(limit);
    rows
}
