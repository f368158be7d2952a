//! Declarative logger configuration
//!
//! A `RegistryConfig` describes logger settings (level, propagation, static
//! fields, extra macros and named handlers) and is applied with
//! [`Registry::apply_config`](super::registry::Registry::apply_config).
//!
//! # Example
//!
//! ```
//! use rust_log_hierarchy::{LogLevel, Registry, RegistryConfig};
//!
//! let config = RegistryConfig::from_json(r#"{
//!     "loggers": [
//!         { "name": "", "level": "INFO" },
//!         { "name": "db", "level": "WARNING", "fields": { "component": "db" } },
//!         { "name": "db.pool", "propagate": false }
//!     ]
//! }"#).unwrap();
//!
//! let registry = Registry::new();
//! registry.apply_config(&config).unwrap();
//! assert_eq!(registry.get_logger("db.pool").effective_level(), LogLevel::Warn);
//! ```

use super::{
    error::{LoggerError, Result},
    field::Fields,
    log_level::LogLevel,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_propagate() -> bool {
    true
}

/// Settings for one logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Dotted logger name; empty for the root
    pub name: String,

    /// Explicit level; `None` inherits from ancestors
    #[serde(default)]
    pub level: Option<LogLevel>,

    #[serde(default = "default_propagate")]
    pub propagate: bool,

    /// Static fields appended to every record
    #[serde(default)]
    pub fields: Fields,

    /// Extra macro values for formatter macro tables
    #[serde(default)]
    pub extra_macros: Fields,

    /// Names of registry handlers to attach
    #[serde(default)]
    pub handlers: Vec<String>,
}

impl LoggerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            propagate: true,
            fields: Fields::new(),
            extra_macros: Fields::new(),
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    #[must_use]
    pub fn handler(mut self, name: impl Into<String>) -> Self {
        self.handlers.push(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations naming the same logger twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for logger in &self.loggers {
            if !seen.insert(logger.name.as_str()) {
                return Err(LoggerError::config(
                    "RegistryConfig",
                    format!("logger '{}' is configured more than once", logger.name),
                ));
            }
        }
        Ok(())
    }
}
