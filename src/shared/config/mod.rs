//! Application configuration module
//!
//! Provides the configuration shared by the client library and the server.
//! Values come from (lowest to highest precedence) built-in defaults, an
//! optional TOML file, and `WOLFPACK_*` environment variables.
//!
//! ```toml
//! server_url = "https://api.wolfpack.example"
//! sync_interval_secs = 60
//! failure_policy = "block_all"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// How a failed submission affects the rest of a drain cycle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A failure blocks later actions of the same kind only; causally
    /// independent kinds keep syncing
    #[default]
    BlockSameKind,
    /// The first failure ends the cycle
    BlockAll,
}

impl std::str::FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block_same_kind" => Ok(Self::BlockSameKind),
            "block_all" => Ok(Self::BlockAll),
            other => Err(ConfigError::InvalidValue {
                field: "failure_policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Periodic sync interval
    pub sync_interval_secs: u64,
    /// Connectivity probe interval
    pub probe_interval_secs: u64,
    /// Per-request timeout for submissions and probes
    pub request_timeout_secs: u64,
    /// Largest payload accepted into the queue
    pub max_payload_bytes: usize,
    /// Drain failure policy
    pub failure_policy: FailurePolicy,
    /// First backoff delay after a failed cycle
    pub backoff_base_secs: u64,
    /// Backoff ceiling
    pub backoff_max_secs: u64,
    /// Local database file; platform data directory when unset
    pub database_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            sync_interval_secs: 30,
            probe_interval_secs: 15,
            request_timeout_secs: 10,
            max_payload_bytes: 64 * 1024,
            failure_policy: FailurePolicy::default(),
            backoff_base_secs: 2,
            backoff_max_secs: 300,
            database_path: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `WOLFPACK_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("WOLFPACK_SERVER_URL") {
            self.server_url = Some(url);
        }
        if let Ok(secs) = std::env::var("WOLFPACK_SYNC_INTERVAL_SECS") {
            self.sync_interval_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                field: "sync_interval_secs",
                value: secs,
            })?;
        }
        if let Ok(path) = std::env::var("WOLFPACK_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Ok(policy) = std::env::var("WOLFPACK_FAILURE_POLICY") {
            self.failure_policy = policy.parse()?;
        }
        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.backoff_base_secs > self.backoff_max_secs {
            return Err(ConfigError::InvalidValue {
                field: "backoff_base_secs",
                value: self.backoff_base_secs.to_string(),
            });
        }
        Ok(())
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = Some(url.into());
        self
    }

    pub fn sync_interval_secs(mut self, secs: u64) -> Self {
        self.config.sync_interval_secs = secs;
        self
    }

    pub fn max_payload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_payload_bytes = bytes;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn backoff_secs(mut self, base: u64, max: u64) -> Self {
        self.config.backoff_base_secs = base;
        self.config.backoff_max_secs = max;
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
