//! Feed Types
//!
//! Source rows for the Wolf Pack feed and the normalized [`FeedItem`] they
//! merge into. Rows come from three tables (video posts, events, DJ events);
//! the client turns each into a `FeedItem` and orders them newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source table a feed item came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FeedItemKind {
    VideoPost,
    Event,
    DjEvent,
}

impl FeedItemKind {
    /// Source table name
    pub fn table(&self) -> &'static str {
        match self {
            FeedItemKind::VideoPost => "video_posts",
            FeedItemKind::Event => "events",
            FeedItemKind::DjEvent => "dj_events",
        }
    }
}

/// Likes, comments and shares on a feed item
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u32,
    pub comments: u32,
    pub shares: u32,
}

/// Identity of a feed item: source table plus row id
pub type FeedKey = (FeedItemKind, String);

/// Normalized feed entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub kind: FeedItemKind,
    pub user_id: Option<String>,
    pub display_name: String,
    pub content: String,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub engagement: Engagement,
}

impl FeedItem {
    pub fn key(&self) -> FeedKey {
        (self.kind, self.id.clone())
    }
}

/// Row of the `video_posts` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoPostRow {
    pub id: String,
    pub user_id: String,
    pub author_name: Option<String>,
    pub caption: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub shares_count: u32,
}

/// Row of the `events` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_by: Option<String>,
    pub host_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `dj_events` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DjEventRow {
    pub id: String,
    pub dj_id: String,
    pub dj_name: Option<String>,
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub participant_count: u32,
}

impl From<VideoPostRow> for FeedItem {
    fn from(row: VideoPostRow) -> Self {
        FeedItem {
            display_name: row.author_name.unwrap_or_else(|| "Wolf Pack Member".to_string()),
            content: row.caption.unwrap_or_default(),
            media_url: row.video_url.or(row.thumbnail_url),
            user_id: Some(row.user_id),
            created_at: row.created_at,
            engagement: Engagement {
                likes: row.likes_count,
                comments: row.comments_count,
                shares: row.shares_count,
            },
            kind: FeedItemKind::VideoPost,
            id: row.id,
        }
    }
}

impl From<EventRow> for FeedItem {
    fn from(row: EventRow) -> Self {
        let content = match row.description {
            Some(description) if !description.is_empty() => format!("{}\n{}", row.title, description),
            _ => row.title,
        };
        FeedItem {
            display_name: row.host_name.unwrap_or_else(|| "Side Hustle Bar".to_string()),
            content,
            media_url: row.image_url,
            user_id: row.created_by,
            created_at: row.created_at,
            engagement: Engagement::default(),
            kind: FeedItemKind::Event,
            id: row.id,
        }
    }
}

impl From<DjEventRow> for FeedItem {
    fn from(row: DjEventRow) -> Self {
        let content = match row.description {
            Some(description) if !description.is_empty() => format!("{}\n{}", row.title, description),
            _ => row.title,
        };
        FeedItem {
            display_name: row.dj_name.unwrap_or_else(|| "DJ".to_string()),
            content,
            media_url: None,
            user_id: Some(row.dj_id),
            created_at: row.created_at,
            // Participants are the closest thing a DJ event has to likes
            engagement: Engagement {
                likes: row.participant_count,
                ..Engagement::default()
            },
            kind: FeedItemKind::DjEvent,
            id: row.id,
        }
    }
}

/// Row data carried by a realtime change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "table", content = "record", rename_all = "snake_case")]
pub enum FeedRecord {
    VideoPosts(VideoPostRow),
    Events(EventRow),
    DjEvents(DjEventRow),
}

impl FeedRecord {
    pub fn into_item(self) -> FeedItem {
        match self {
            FeedRecord::VideoPosts(row) => row.into(),
            FeedRecord::Events(row) => row.into(),
            FeedRecord::DjEvents(row) => row.into(),
        }
    }
}

/// A single-row change pushed by the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowChange {
    Insert(FeedRecord),
    Update(FeedRecord),
    Delete { kind: FeedItemKind, id: String },
}
