//! Configuration management for Interplay.
//!
//! The configuration file lives at `~/.interplay/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (INTERPLAY_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `INTERPLAY_TIMEOUT_TICKS` → interaction.timeout_ticks
//! - `INTERPLAY_TICKS_PER_SECOND` → interaction.ticks_per_second
//! - `INTERPLAY_POLL_INTERVAL_MS` → interaction.poll_interval_ms
//! - `INTERPLAY_LOG_LEVEL` → observability.log_level
//! - `INTERPLAY_LOG_FORMAT` → observability.log_format

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".interplay"),
        |dirs| dirs.home_dir().join(".interplay"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Interaction Configuration
// ============================================================================

/// Timing and command settings for interactive sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Countdown a fresh session starts with, in host ticks.
    #[serde(default = "default_timeout_ticks")]
    pub timeout_ticks: u32,

    /// Host tick rate, used to turn wall-clock polling into tick decrements.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,

    /// How often each timeout watcher wakes up.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Name of the host help command to override.
    #[serde(default = "default_help_command")]
    pub help_command: String,

    /// Aliases the overriding help command answers to in addition to the
    /// original help command's names.
    #[serde(default = "default_help_aliases")]
    pub help_aliases: Vec<String>,

    /// Message sent when a command's help callback fails.
    #[serde(default = "default_no_help_message")]
    pub no_help_message: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: default_timeout_ticks(),
            ticks_per_second: default_ticks_per_second(),
            poll_interval_ms: default_poll_interval_ms(),
            help_command: default_help_command(),
            help_aliases: default_help_aliases(),
            no_help_message: default_no_help_message(),
        }
    }
}

impl InteractionConfig {
    /// Effective timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        if self.ticks_per_second == 0 {
            return 0;
        }
        u64::from(self.timeout_ticks) * 1000 / u64::from(self.ticks_per_second)
    }
}

fn default_timeout_ticks() -> u32 {
    1200
}

fn default_ticks_per_second() -> u32 {
    60
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_help_command() -> String {
    "help".into()
}

fn default_help_aliases() -> Vec<String> {
    vec!["cmds".into()]
}

fn default_no_help_message() -> String {
    "There is no help for this command available.".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Interactive session settings
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("INTERPLAY_TIMEOUT_TICKS") {
            match value.parse() {
                Ok(ticks) => self.interaction.timeout_ticks = ticks,
                Err(_) => tracing::warn!(value = %value, "Ignoring invalid INTERPLAY_TIMEOUT_TICKS"),
            }
        }
        if let Some(value) = lookup("INTERPLAY_TICKS_PER_SECOND") {
            match value.parse() {
                Ok(rate) => self.interaction.ticks_per_second = rate,
                Err(_) => {
                    tracing::warn!(value = %value, "Ignoring invalid INTERPLAY_TICKS_PER_SECOND")
                }
            }
        }
        if let Some(value) = lookup("INTERPLAY_POLL_INTERVAL_MS") {
            match value.parse() {
                Ok(ms) => self.interaction.poll_interval_ms = ms,
                Err(_) => {
                    tracing::warn!(value = %value, "Ignoring invalid INTERPLAY_POLL_INTERVAL_MS")
                }
            }
        }
        if let Some(level) = lookup("INTERPLAY_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("INTERPLAY_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_reproduce_twenty_second_timeout() {
        let config = InteractionConfig::default();
        assert_eq!(config.timeout_ticks, 1200);
        assert_eq!(config.ticks_per_second, 60);
        assert_eq!(config.timeout_ms(), 20_000);
        assert_eq!(config.help_command, "help");
        assert_eq!(config.help_aliases, vec!["cmds".to_string()]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"interaction": {{"timeout_ticks": 600}}, "observability": {{"format": "json"}}}}"#).unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.interaction.timeout_ticks, 600);
        assert_eq!(config.interaction.ticks_per_second, 60);
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_load_from_missing_file_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("INTERPLAY_TIMEOUT_TICKS", "2400"),
            ("INTERPLAY_TICKS_PER_SECOND", "not-a-number"),
            ("INTERPLAY_LOG_LEVEL", "debug"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.interaction.timeout_ticks, 2400);
        assert_eq!(config.interaction.ticks_per_second, 60);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");
    }
}
