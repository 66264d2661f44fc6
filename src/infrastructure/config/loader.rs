use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Completion {0} cannot be empty")]
    EmptyCompletionSetting(&'static str),

    #[error("Invalid {0}: must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Project directory holding configuration and the default database.
    pub const CONFIG_DIR: &'static str = ".taskpilot";

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .taskpilot/config.yaml (project config, created by init)
    /// 3. .taskpilot/local.yaml (local overrides, optional)
    /// 4. Environment variables (TASKPILOT_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let dir = Path::new(Self::CONFIG_DIR);
        let config: Config = Self::base()
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("TASKPILOT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Self::base()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TASKPILOT_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.completion.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyCompletionSetting("base_url"));
        }

        if config.completion.model.trim().is_empty() {
            return Err(ConfigError::EmptyCompletionSetting("model"));
        }

        if config.completion.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("completion.timeout_secs"));
        }

        if config.orchestrator.request_deadline_secs == 0 {
            return Err(ConfigError::ZeroTimeout("orchestrator.request_deadline_secs"));
        }

        Ok(())
    }

    /// Default YAML written by `taskpilot init`.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default configuration")
    }
}
