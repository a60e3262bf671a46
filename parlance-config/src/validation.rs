// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
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

    /// Validate that a list has at least one entry
    pub fn not_empty_list<T>(values: &[T], field: &str) -> Result<()> {
        if values.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} must contain at least one entry",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a list holds no repeated entries
    pub fn unique<T: PartialEq + std::fmt::Debug>(values: &[T], field: &str) -> Result<()> {
        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} lists {:?} more than once",
                    field, value
                )));
            }
        }
        Ok(())
    }
}
