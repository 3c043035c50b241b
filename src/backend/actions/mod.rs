//! Action Endpoints
//!
//! Accepts the actions clients queued while offline. Replays are detected
//! by action id and acknowledged without being applied twice.

/// Order, profile and feedback handlers
pub mod handlers;

pub use handlers::{create_order, submit_feedback, update_profile};
