//! Configuration management for rsperms.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use rsperms_server::config::RspermsConfig;
//!
//! // Load from file with env overrides
//! let config = RspermsConfig::load("rsperms.yaml")?;
//!
//! // Or load from environment only
//! let config = RspermsConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use rsperms_domain::{ResolverConfig, UserManagerConfig, DEFAULT_GROUP};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

use crate::observability::LoggingConfig;

/// Environment variable prefix.
const ENV_PREFIX: &str = "RSPERMS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RspermsConfig {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// User resolution settings
    #[serde(default)]
    pub users: UserSettings,

    /// Permission resolver settings
    #[serde(default)]
    pub resolver: ResolverSettings,
}

/// Storage settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Storage backend. Only `memory` is available.
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON instead of pretty text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingSettings {
    /// Converts to the subscriber configuration. Unknown levels fall back
    /// to INFO; [`RspermsConfig::validate`] rejects them earlier.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            json: self.json,
            level: self.level.parse::<Level>().unwrap_or(Level::INFO),
        }
    }
}

/// User resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserSettings {
    /// Group assigned to users without a permanent membership
    #[serde(default = "default_group")]
    pub default_group: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_group: default_group(),
        }
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

impl UserSettings {
    /// Converts to the user manager configuration.
    pub fn to_manager_config(&self) -> UserManagerConfig {
        UserManagerConfig::default().with_default_group(self.default_group.trim())
    }
}

/// Permission resolver settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResolverSettings {
    /// Maximum group inheritance depth
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> u32 {
    ResolverConfig::default().max_depth
}

impl ResolverSettings {
    /// Converts to the resolver configuration.
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default().with_max_depth(self.max_depth)
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl RspermsConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `RSPERMS_` and use `__` as
    /// separator. For example:
    /// - `RSPERMS_USERS__DEFAULT_GROUP=member` overrides `users.default_group`
    /// - `RSPERMS_LOGGING__LEVEL=debug` overrides `logging.level`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&RspermsConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()?;

        let loaded: RspermsConfig = config.try_deserialize()?;
        loaded.validate()?;

        Ok(loaded)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&RspermsConfig::default())?)
            .add_source(environment())
            .build()?;

        let loaded: RspermsConfig = config.try_deserialize()?;
        loaded.validate()?;

        Ok(loaded)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_backends = ["memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "storage.backend must be one of: {:?}, got: {}",
                    valid_backends, self.storage.backend
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        let group = self.users.default_group.trim();
        if group.is_empty() || group.contains(char::is_whitespace) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "users.default_group must be a non-empty name without whitespace, got: '{}'",
                    self.users.default_group
                ),
            });
        }

        if self.resolver.max_depth == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "resolver.max_depth must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

// RSPERMS_USERS__DEFAULT_GROUP -> users.default_group
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
