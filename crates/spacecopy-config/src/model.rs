//! Configuration model.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder that must appear exactly once in the service key format.
pub const SERVICE_PLACEHOLDER: &str = "{service}";

/// Default format of the bridge service key name.
///
/// `{org}` and `{space}` are bound to the destination org and space names.
pub const DEFAULT_SERVICE_KEY_FORMAT: &str = "__{service}_copy_for_/{org}/{space}";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Format of the service key created on a source instance to read its
    /// credentials for a user-provided copy.
    pub service_key_format: String,
    /// Services to copy as user-provided services instead of managed ones.
    pub copy_as_ups: UpsPolicyConfig,
    /// Delete and rebuild same-named destination instances.
    pub recreate: bool,
    pub logging: LoggingConfig,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            service_key_format: DEFAULT_SERVICE_KEY_FORMAT.to_string(),
            copy_as_ups: UpsPolicyConfig::default(),
            recreate: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Which managed services are represented at the destination as
/// user-provided services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsPolicyConfig {
    /// Service instance names.
    pub instances: Vec<String>,
    /// Service offering labels.
    pub offering_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CopyConfig {
    /// Parse from a TOML string. Missing fields take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::parse(e.to_string()))
    }

    /// Trims list entries, drops empty ones and lowercases the log level.
    pub fn normalize(&mut self) {
        for list in [
            &mut self.copy_as_ups.instances,
            &mut self.copy_as_ups.offering_labels,
        ] {
            *list = list
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect();
        }
        self.logging.level = self.logging.level.trim().to_lowercase();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let placeholders = self.service_key_format.matches(SERVICE_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(ConfigError::validation(format!(
                "service_key_format must contain {SERVICE_PLACEHOLDER} exactly once, found {placeholders} in '{}'",
                self.service_key_format
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        Ok(())
    }
}
