//! Client Library
//!
//! Everything a Wolf Pack app needs to keep working offline.
//!
//! # Architecture
//!
//! - **`config`** - Server URL, sync tuning, session token
//! - **`api`** - Submits queued actions to the API server
//! - **`local_db`** - SQLite action queue and sync metadata
//! - **`offline`** - Action queue trait, optimistic updates, the
//!   [`OfflineManager`](offline::OfflineManager) facade
//! - **`sync`** - Connectivity monitor, drain coordinator, background service
//! - **`feed`** - Merged community feed with incremental realtime updates
//! - **`error`** - Client error types
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs
//! ├── api.rs
//! ├── config.rs
//! ├── error.rs
//! ├── feed/        - adapter, cache, realtime follow
//! ├── local_db/    - schema, SQLite queue
//! ├── offline/     - queue, retry, optimistic, facade
//! └── sync/        - monitor, coordinator, background, scheduler, status
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod local_db;
pub mod offline;
pub mod sync;

pub use config::Config;
pub use error::{ApiError, OfflineError, StoreError};
pub use offline::OfflineManager;
pub use sync::{DrainOutcome, SyncStatus};
