// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate port number
    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid port number (1-65535)",
                field
            )));
        }
        Ok(())
    }

    /// Validate a host name: non-empty and free of whitespace and scheme prefixes.
    pub fn is_host(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if value.contains(char::is_whitespace) || value.contains("://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a bare host name, got {:?}",
                field, value
            )));
        }
        Ok(())
    }
}
