use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::RouterConfig;
use crate::router::RouteTable;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl RouterConfig {
    /// Returns the path to the route table file.
    ///
    /// Uses `~/.config/pagerouter/routes.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("pagerouter").join("routes.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `RouterConfig::default()`.
    /// - Otherwise behaves like [`RouterConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(RouterConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads, parses and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: RouterConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The route table itself is well formed (see [`RouteTable::new`])
    /// - The home and login routes exist in the table
    /// - Numeric limits are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table = RouteTable::new(self.routes.clone()).map_err(|e| {
            ConfigError::ValidationError {
                message: e.to_string(),
            }
        })?;

        for (role, name) in [("home", &self.router.home), ("login", &self.router.login)] {
            if table.by_name(name).is_none() {
                return Err(ConfigError::ValidationError {
                    message: format!("{} route '{}' not found in route table", role, name),
                });
            }
        }

        if self.router.history_limit == 0 {
            return Err(ConfigError::ValidationError {
                message: "history_limit must be at least 1".to_string(),
            });
        }

        if self.router.max_redirects == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_redirects must be at least 1".to_string(),
            });
        }

        if self.router.guard_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "guard_timeout_ms must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RouterConfig::default().validate().unwrap();
    }

    #[test]
    fn missing_login_route_fails_validation() {
        let mut config = RouterConfig::default();
        config.routes.retain(|r| r.name != "login");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("login route 'login'"));
    }

    #[test]
    fn zero_max_redirects_fails_validation() {
        let mut config = RouterConfig::default();
        config.router.max_redirects = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_redirects must be at least 1"));
    }

    #[test]
    fn zero_history_limit_fails_validation() {
        let mut config = RouterConfig::default();
        config.router.history_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
