// Environment variable loading

use crate::{ConfigError, Result};
use std::env;

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Full variable name for a key, e.g. `DEFAULT` -> `PARLANCE_DEFAULT`.
    pub fn key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.key(key)).map_err(ConfigError::EnvError)
    }

    /// Load a variable if it is set and non-empty.
    pub fn var(&self, key: &str) -> Option<String> {
        self.load_var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Load a comma separated list.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.var(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }

    /// Load a boolean flag (`1`, `true`, `yes`, `on` / `0`, `false`, `no`, `off`).
    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.var(key) else {
            return Ok(None);
        };

        match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: self.key(key),
                value,
            }),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
