//! Engine configuration
//!
//! Loaded with the `config` crate: built-in defaults, then an optional file,
//! then `ISSUE_ENGINE__*` environment variables
//! (e.g. `ISSUE_ENGINE__AUTOMATION__ENABLED=false`).

#![deny(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on product ids handed to automation in one run
pub const MAX_AUTOMATION_ITEMS: usize = 20;

pub const ENV_PREFIX: &str = "ISSUE_ENGINE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: DetectionConfig,
    pub automation: AutomationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Run builders on the rayon pool instead of sequentially
    pub parallel_builders: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            parallel_builders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub enabled: bool,
    /// At most [`MAX_AUTOMATION_ITEMS`]
    pub max_items_per_run: usize,
    /// Bounded queue between the engine and the trigger worker
    pub queue_capacity: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items_per_run: MAX_AUTOMATION_ITEMS,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for the log file; defaults to the platform data dir
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Per-target level overrides, e.g. `"rayon": "warn"`
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: "issue-engine.log".to_string(),
            module_filters: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `ISSUE_ENGINE__*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Defaults, then the given file (if any), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default per-user location when it exists
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path().filter(|p| p.exists()) {
            Some(path) => Self::load(Some(&path)),
            None => Self::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.automation.max_items_per_run == 0 || self.automation.max_items_per_run > MAX_AUTOMATION_ITEMS {
            return Err(ConfigError::Validation {
                message: format!(
                    "automation.max_items_per_run must be between 1 and {MAX_AUTOMATION_ITEMS}, got {}",
                    self.automation.max_items_per_run
                ),
            });
        }
        if self.automation.queue_capacity == 0 {
            return Err(ConfigError::Validation {
                message: "automation.queue_capacity must be greater than 0".to_string(),
            });
        }
        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::Validation {
                message: "logging needs console_output or file_output".to_string(),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "logging.level must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// `<config dir>/storefront-issues/engine.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storefront-issues").join("engine.toml"))
}
