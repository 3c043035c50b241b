/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load server configuration
 * 2. Create the action ledger and feed tables (seeded on request)
 * 3. Create the router with all routes
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing Wolf Pack API server");

    let app_state = if config.seed_feed {
        tracing::info!("Seeding demo feed");
        AppState::seeded()
    } else {
        AppState::default()
    };

    create_app_with_state(app_state)
}

/// Create the application around existing state
///
/// Tests keep a clone of `app_state` to inspect what the server accepted.
pub fn create_app_with_state(app_state: AppState) -> Router<()> {
    let app = create_router(app_state);
    tracing::info!("Router configured");
    app
}
