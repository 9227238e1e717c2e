//! Layered configuration loading
//!
//! Priority order (lowest to highest):
//! 1. Defaults - Hardcoded sane defaults
//! 2. File config - From spacecopy.toml
//! 3. Environment variables - SPACECOPY__* pattern, e.g.
//!    `SPACECOPY__COPY_AS_UPS__INSTANCES=svc1,svc3`
//!
//! Command-line flags are applied on top by the binary.

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat, Map};
use tracing::debug;

use crate::ConfigError;
use crate::model::CopyConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "spacecopy.toml";

/// Prefix of the environment variables read by the loader.
pub const ENV_PREFIX: &str = "SPACECOPY";

/// Nested keys separator in environment variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: [&str; 2] = ["copy_as_ups.instances", "copy_as_ups.offering_labels"];

/// Builds a [`CopyConfig`] from defaults, an optional file, and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    /// Create a loader reading the process environment and no file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the given TOML file. A missing file is not an error.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Read environment variables from `vars` instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load, merge, normalize and validate.
    pub fn load(&self) -> Result<CopyConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.path {
            debug!("Reading config file {:?}", path);
            builder = builder.add_source(
                File::from(path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let mut env = Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .source(self.env.clone());
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }
        builder = builder.add_source(env);

        let mut config: CopyConfig = builder
            .build()
            .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ConfigLoader::new()
            .with_file("/nonexistent/spacecopy.toml")
            .with_env(Vec::<(String, String)>::new())
            .load()
            .unwrap();
        assert_eq!(config, CopyConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
            service_key_format = "file-{service}"
            recreate = false

            [copy_as_ups]
            offering_labels = ["RabbitMQ"]
            "#,
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .with_env([
                ("SPACECOPY__RECREATE", "true"),
                ("SPACECOPY__COPY_AS_UPS__INSTANCES", "svc1, svc3,"),
                ("SPACECOPY__LOGGING__LEVEL", "DEBUG"),
            ])
            .load()
            .unwrap();

        assert_eq!(config.service_key_format, "file-{service}");
        assert!(config.recreate);
        assert_eq!(config.copy_as_ups.instances, vec!["svc1", "svc3"]);
        assert_eq!(config.copy_as_ups.offering_labels, vec!["RabbitMQ"]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_list_of_offering_labels() {
        let config = ConfigLoader::new()
            .with_env([("SPACECOPY__COPY_AS_UPS__OFFERING_LABELS", "RabbitMQ,MySQL")])
            .load()
            .unwrap();
        assert_eq!(config.copy_as_ups.offering_labels, vec!["RabbitMQ", "MySQL"]);
        assert!(config.copy_as_ups.instances.is_empty());
    }

    #[test]
    fn test_unrelated_env_vars_ignored() {
        let config = ConfigLoader::new()
            .with_env([("SPACECOPY_CONFIG", "other.toml"), ("HOME", "/root")])
            .load()
            .unwrap();
        assert_eq!(config, CopyConfig::default());
    }

    #[test]
    fn test_invalid_env_values_rejected() {
        let err = ConfigLoader::new()
            .with_env([("SPACECOPY__RECREATE", "maybe")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = ConfigLoader::new()
            .with_env([("SPACECOPY__SERVICE_KEY_FORMAT", "static-key")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "recreate = [").unwrap();

        let err = ConfigLoader::new()
            .with_file(&path)
            .with_env(Vec::<(String, String)>::new())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
