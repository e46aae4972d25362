//! Layered configuration loading using figment.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. `flashcards.toml` in the working directory, or the file given with `--config`
//! 3. Environment variables with the `FLASHCARDS_` prefix, `__` separating
//!    sections (`FLASHCARDS_PATHS__CATEGORIES` -> `paths.categories`)
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:8080"
//!
//! [paths]
//! categories = "/api/v1/categories"
//!
//! [logging]
//! level = "debug"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "flashcards.toml";
pub const ENV_PREFIX: &str = "FLASHCARDS_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: ApiPaths,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address (host:port).
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// Base path of each resource. `/details` and `/{id}` are mounted below it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiPaths {
    #[serde(default = "default_categories_path")]
    pub categories: String,
    #[serde(default = "default_sessions_path")]
    pub sessions: String,
    #[serde(default = "default_flashcards_path")]
    pub flashcards: String,
}

fn default_categories_path() -> String {
    "/api/v1/categories".to_string()
}

fn default_sessions_path() -> String {
    "/api/v1/sessions".to_string()
}

fn default_flashcards_path() -> String {
    "/api/v1/flashcards".to_string()
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            categories: default_categories_path(),
            sessions: default_sessions_path(),
            flashcards: default_flashcards_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when `FLASHCARDS_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl AppConfig {
    /// Load from all sources and validate.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain. An explicit `file` must exist; the default
    /// file is optional.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let path = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.is_some() {
            figment = figment.merge(Toml::file_exact(path));
        } else if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .addr
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.addr".to_string(),
                reason: err.to_string(),
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        let paths = [
            ("paths.categories", &self.paths.categories),
            ("paths.sessions", &self.paths.sessions),
            ("paths.flashcards", &self.paths.flashcards),
        ];
        for (field, path) in paths {
            if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("`{path}` must start with '/' and not end with '/'"),
                });
            }
        }
        for (i, (field, path)) in paths.iter().enumerate() {
            if paths[..i].iter().any(|(_, other)| other == path) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("`{path}` is already used by another resource"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.paths.categories, "/api/v1/categories");
        assert_eq!(config.paths.sessions, "/api/v1/sessions");
        assert_eq!(config.paths.flashcards, "/api/v1/flashcards");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_then_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [server]
                addr = "0.0.0.0:9000"

                [paths]
                sessions = "/v2/sessions"
                "#,
            )?;
            jail.set_env("FLASHCARDS_PATHS__FLASHCARDS", "/v2/cards");

            let config = AppConfig::load(None).expect("config loads");
            assert_eq!(config.server.addr, "0.0.0.0:9000");
            assert_eq!(config.paths.categories, "/api/v1/categories");
            assert_eq!(config.paths.sessions, "/v2/sessions");
            assert_eq!(config.paths.flashcards, "/v2/cards");
            Ok(())
        });
    }

    #[test]
    fn log_filter_variable_does_not_clash() {
        Jail::expect_with(|jail| {
            jail.set_env("FLASHCARDS_LOG", "debug");
            let config = AppConfig::load(None).expect("config loads");
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn explicit_file_must_exist() {
        Jail::expect_with(|_jail| {
            assert!(AppConfig::load(Some(Path::new("missing.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn rejects_bad_values() {
        Jail::expect_with(|jail| {
            jail.set_env("FLASHCARDS_SERVER__ADDR", "not-an-addr");
            assert!(matches!(
                AppConfig::load(None),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.set_env("FLASHCARDS_PATHS__SESSIONS", "/api/v1/categories");
            let err = AppConfig::load(None).unwrap_err();
            assert!(err.to_string().contains("paths.sessions"), "{err}");
            Ok(())
        });
    }
}
