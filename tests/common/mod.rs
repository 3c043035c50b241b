//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - A scripted transport standing in for the remote API
//! - Payload and configuration fixtures
//! - Helpers that wait on status and event channels
//! - Custom assertion macros

#[macro_use]
pub mod assertions;
pub mod fixtures;
pub mod transport;

// Re-export commonly used utilities
pub use fixtures::*;
pub use transport::*;
