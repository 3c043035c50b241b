//! Wolf Pack Sync - Main Library
//!
//! Offline action queue and sync for the Wolf Pack sports-bar app. Patrons
//! can order, edit their profile and leave feedback without a connection;
//! the actions are stored locally and replayed against the API server once
//! the device is back online.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and backend
//!   - Action model and typed payloads
//!   - Sync events and reports
//!   - Feed rows and normalized feed items
//!   - Configuration and error types
//!
//! - **`client`** - The offline client library
//!   - Durable action queue (SQLite or in-memory)
//!   - Connectivity monitor and sync coordinator
//!   - Reactive `OfflineManager` facade for UI code
//!   - Optimistic updates and the realtime feed cache
//!
//! - **`backend`** - API server (only compiled with `ssr` feature)
//!   - Accepts orders, profile edits and feedback
//!   - Deduplicates replays by `Idempotency-Key`
//!   - Serves the feed tables
//!
//! # Feature Flags
//!
//! - **`ssr`** - Builds the Axum server and the `wolfpack-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use wolfpack_sync::client::{Config, OfflineManager};
//! use wolfpack_sync::shared::FeedbackSubmission;
//!
//! # async fn example() -> Result<(), wolfpack_sync::client::OfflineError> {
//! let manager = OfflineManager::open(Config::from_env()?).await?;
//! manager.register_periodic_update().await;
//!
//! let id = manager
//!     .submit_feedback(&FeedbackSubmission {
//!         rating: 5,
//!         message: "Best wings in town".into(),
//!         category: None,
//!     })
//!     .await?;
//! println!("queued {} ({} waiting)", id, manager.status().sync_items);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Client**: shared state is `Arc` plus tokio `RwLock`/`watch`/`broadcast`
//! - **Server**: all state is behind `Arc<RwLock<>>` in `AppState`

/// Shared types and data structures
pub mod shared;

/// Offline client library
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
