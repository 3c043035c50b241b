/**
 * Server Configuration
 *
 * Loads the server settings from environment variables, with defaults
 * suitable for local development.
 *
 * # Environment
 *
 * - `SERVER_PORT` - listen port (default 3000)
 * - `WOLFPACK_SEED_FEED` - load the demo feed on startup (default true)
 *
 * Invalid values are logged and replaced by the default; they never
 * prevent startup.
 */

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub seed_feed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            seed_feed: true,
        }
    }
}

/// Load server settings from the environment
pub fn load_server_config() -> ServerConfig {
    let defaults = ServerConfig::default();

    let port = match std::env::var("SERVER_PORT") {
        Ok(value) => value.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!("Invalid SERVER_PORT '{}', using {}", value, defaults.port);
            defaults.port
        }),
        Err(_) => defaults.port,
    };

    let seed_feed = match std::env::var("WOLFPACK_SEED_FEED") {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => {
                tracing::warn!("Invalid WOLFPACK_SEED_FEED '{}', seeding anyway", value);
                true
            }
        },
        Err(_) => defaults.seed_feed,
    };

    ServerConfig { port, seed_feed }
}
