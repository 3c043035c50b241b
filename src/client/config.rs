use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Client configuration: shared settings plus the session token.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `WOLFPACK_*` environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::from_app(AppConfig::from_env()?))
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::from_app(builder.build()?))
    }

    pub fn from_app(app: AppConfig) -> Self {
        Self { app, token: None }
    }

    /// Shared settings
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Set the session token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the session token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url().trim_end_matches('/'), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url()
    }
}
