//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the client library and the backend. These types are serialized over the
//! HTTP API and into the client's local store.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code.

/// Queued action model and typed payloads
pub mod action;

/// Sync event system
pub mod event;

/// Feed source rows and normalized feed items
pub mod feed;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use action::{ActionKind, ActionReceipt, FeedbackSubmission, OrderDraft, OrderLine, PendingAction, ProfileChanges};
pub use event::{SyncEvent, SyncReport, SyncTrigger};
pub use feed::{DjEventRow, Engagement, EventRow, FeedItem, FeedItemKind, FeedKey, FeedRecord, RowChange, VideoPostRow};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FailurePolicy};
