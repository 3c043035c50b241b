//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, health check, fallback
//! └── api_routes.rs   - Action and feed endpoints
//! ```
//!
//! # Route Types
//!
//! - `GET /health` - Connectivity probe target
//! - `POST /api/orders`, `PATCH /api/profile`, `POST /api/feedback`
//! - `GET /api/feed/{video_posts,events,dj_events}`

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
