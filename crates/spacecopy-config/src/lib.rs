//! Configuration for spacecopy.
//!
//! Settings are merged from hardcoded defaults, a TOML file
//! (`spacecopy.toml`) and `SPACECOPY__*` environment variables with the
//! `config` crate, then validated. See [`loader`] for the priority order.

pub mod loader;
pub mod model;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE, ENV_PREFIX, ENV_SEPARATOR};
pub use model::{
    CopyConfig, DEFAULT_SERVICE_KEY_FORMAT, LoggingConfig, SERVICE_PLACEHOLDER, UpsPolicyConfig,
};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
