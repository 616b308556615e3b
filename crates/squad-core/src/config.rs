//! Configuration loading and typed config structures for a squad session.
//!
//! The configuration lives in `squad-config.yaml` in the working directory
//! (or wherever `SQUAD_CONFIG` points). Every field has a default, so an
//! empty or missing file yields a playable production session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use squad_agents::{ComplianceRules, FallbackMode};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "squad-config.yaml";

/// Environment variable that overrides the configuration file path.
pub const CONFIG_PATH_ENV: &str = "SQUAD_CONFIG";

/// Upper bound on how long a decision source may take for one agent.
pub const MAX_DECISION_TIMEOUT_MS: u64 = 5000;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level session configuration.
///
/// Mirrors the structure of `squad-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionConfig {
    /// Round pacing, seeding and decision handling.
    #[serde(default)]
    pub session: SessionSettings,

    /// Thresholds for marine order compliance.
    #[serde(default)]
    pub compliance: ComplianceRules,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document is a valid configuration.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The configuration file to read: `SQUAD_CONFIG` if set, otherwise
    /// [`DEFAULT_CONFIG_FILE`].
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }
}

/// Whether the session runs for real or as a developer simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Deterministic fallbacks; decisions come from a real source.
    #[default]
    Production,
    /// Weighted random fallbacks and a random decision source.
    Mock,
}

impl SessionMode {
    /// The fallback mode this session mode implies.
    pub const fn fallback_mode(self) -> FallbackMode {
        match self {
            Self::Production => FallbackMode::Deterministic,
            Self::Mock => FallbackMode::Mock,
        }
    }
}

/// Session-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSettings {
    /// Seed for dice, disobedience rolls and mock-mode randomness.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Production or mock operation.
    #[serde(default)]
    pub mode: SessionMode,

    /// Milliseconds a decision source has per agent. Values above
    /// [`MAX_DECISION_TIMEOUT_MS`] are clamped.
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Attempts allowed per agent per round before the fallback is final.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// How many recent events a decision request carries.
    #[serde(default = "default_recent_event_window")]
    pub recent_event_window: usize,
}

impl SessionSettings {
    /// The per-agent decision deadline, clamped to the hard ceiling.
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms.min(MAX_DECISION_TIMEOUT_MS))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            mode: SessionMode::default(),
            decision_timeout_ms: default_decision_timeout_ms(),
            max_retries: default_max_retries(),
            recent_event_window: default_recent_event_window(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_decision_timeout_ms() -> u64 {
    MAX_DECISION_TIMEOUT_MS
}

const fn default_max_retries() -> u32 {
    squad_agents::DEFAULT_MAX_RETRIES
}

const fn default_recent_event_window() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
