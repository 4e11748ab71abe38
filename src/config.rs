use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub sentiment: SentimentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    /// How long SQLite waits on a locked database before giving up
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("reviews.db"),
            busy_timeout_ms: 5000,
        }
    }
}

/// Keyword lists used by the sentiment classifier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive: vec!["хорош".to_string(), "люблю".to_string()],
            negative: vec!["плохо".to_string(), "ненавиж".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
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

impl AppConfig {
    /// Load configuration from `REVIEWS_CONFIG` (or `config.toml`), then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("REVIEWS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(
            std::env::var("PORT").ok(),
            std::env::var("DATABASE_PATH").ok(),
        )?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    fn apply_env_overrides(
        &mut self,
        port: Option<String>,
        database_path: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = port {
            self.server.port = port.parse().map_err(|_| ConfigError::Env {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = database_path {
            self.storage.database_path = PathBuf::from(path);
        }
        Ok(())
    }
}
