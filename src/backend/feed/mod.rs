//! Feed Endpoints
//!
//! Serves the three tables the client merges into the community feed.

/// Table listing handlers
pub mod handlers;

pub use handlers::{list_dj_events, list_events, list_video_posts};
