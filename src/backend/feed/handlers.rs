/**
 * Feed Handlers
 *
 * - `GET /api/feed/video_posts?limit=`
 * - `GET /api/feed/events?limit=`
 * - `GET /api/feed/dj_events?limit=`
 *
 * Rows come back newest first. `limit` defaults to 20 and is capped at 100.
 */

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::backend::server::state::SharedFeed;
use crate::shared::{DjEventRow, EventRow, VideoPostRow};

pub const DEFAULT_FEED_LIMIT: usize = 20;
pub const MAX_FEED_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

impl FeedQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_FEED_LIMIT).min(MAX_FEED_LIMIT)
    }
}

pub async fn list_video_posts(State(feed): State<SharedFeed>, Query(query): Query<FeedQuery>) -> Json<Vec<VideoPostRow>> {
    Json(feed.read().await.latest_video_posts(query.limit()))
}

pub async fn list_events(State(feed): State<SharedFeed>, Query(query): Query<FeedQuery>) -> Json<Vec<EventRow>> {
    Json(feed.read().await.latest_events(query.limit()))
}

pub async fn list_dj_events(State(feed): State<SharedFeed>, Query(query): Query<FeedQuery>) -> Json<Vec<DjEventRow>> {
    Json(feed.read().await.latest_dj_events(query.limit()))
}
