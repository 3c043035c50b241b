//! Backend Module
//!
//! Server-side counterpart of the offline queue: a small Axum API that
//! accepts queued actions and serves the feed tables.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`actions`** - Order, profile and feedback endpoints
//! - **`feed`** - Video post, event and DJ event listings
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── actions/        - Queued action handlers
//! ├── feed/           - Feed table handlers
//! └── error/          - Error types
//! ```
//!
//! # Idempotency
//!
//! Every action request carries an `Idempotency-Key` header holding the
//! client-side action id. The [`server::ActionLedger`] remembers processed
//! ids, so a replay after a lost response answers `200` with
//! `duplicate: true` instead of creating a second order.
//!
//! # State Management
//!
//! [`server::AppState`] holds the ledger and the feed tables behind
//! `Arc<RwLock<_>>`. Handlers extract only the half they need through
//! `FromRef`.

/// Server initialization, state, and configuration
pub mod server;

/// HTTP route configuration
pub mod routes;

/// Queued action endpoints
pub mod actions;

/// Feed endpoints
pub mod feed;

/// Backend-specific error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, create_app_with_state, load_server_config, AppState, ServerConfig};
