//! Configuration validation for Interplay.

use thiserror::Error;

use crate::config::{Config, InteractionConfig, ObservabilityConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.interaction.validate() {
            errors.push(e);
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Config {
    /// Load, apply environment overrides, and validate.
    pub fn load_and_validate() -> crate::Result<Self> {
        let config = Self::load_with_env()?;
        Validate::validate(&config)?;
        Ok(config)
    }
}

impl Validate for InteractionConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.timeout_ticks == 0 {
            return Err(ValidationError::InvalidValue {
                field: "interaction.timeout_ticks".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.ticks_per_second == 0 {
            return Err(ValidationError::InvalidValue {
                field: "interaction.ticks_per_second".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.timeout_ms() {
            return Err(ValidationError::InvalidValue {
                field: "interaction.poll_interval_ms".into(),
                reason: format!("must be between 1 and {} (the timeout)", self.timeout_ms()),
            });
        }

        if self.help_command.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "interaction.help_command".into(),
            });
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}
