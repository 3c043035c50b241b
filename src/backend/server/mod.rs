//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState, ActionLedger, FeedTables
//! ├── config.rs       - ServerConfig from the environment
//! └── init.rs         - create_app
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use wolfpack_sync::backend::server::{create_app, load_server_config};
//!
//! # async fn example() -> std::io::Result<()> {
//! let config = load_server_config();
//! let app = create_app(&config);
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{load_server_config, ServerConfig};
pub use init::{create_app, create_app_with_state};
pub use state::{ActionLedger, AppState, FeedTables};
