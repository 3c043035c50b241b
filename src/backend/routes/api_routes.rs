/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Actions
 * - `POST /api/orders` - Place an order
 * - `PATCH /api/profile` - Update the member profile
 * - `POST /api/feedback` - Leave feedback
 *
 * ## Feed
 * - `GET /api/feed/video_posts` - Video posts, newest first
 * - `GET /api/feed/events` - Events, newest first
 * - `GET /api/feed/dj_events` - DJ events, newest first
 */

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::backend::actions::{create_order, submit_feedback, update_profile};
use crate::backend::feed::{list_dj_events, list_events, list_video_posts};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Queued actions
        .route("/api/orders", post(create_order))
        .route("/api/profile", patch(update_profile))
        .route("/api/feedback", post(submit_feedback))
        // Feed tables
        .route("/api/feed/video_posts", get(list_video_posts))
        .route("/api/feed/events", get(list_events))
        .route("/api/feed/dj_events", get(list_dj_events))
}
