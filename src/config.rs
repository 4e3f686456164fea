//! Store configuration.
//!
//! Configuration is optional. Every field has a default, so an empty TOML
//! document is valid:
//!
//! ```toml
//! path = "./db.sqlite"
//! backend = "sqlite"
//!
//! [logging]
//! level = "warn"
//! format = "text"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default database location.
pub const DEFAULT_PATH: &str = "./db.sqlite";

/// Storage engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Single SQLite table (`json`).
    Sqlite,
    /// fjall LSM keyspace in a database directory.
    Fjall,
    /// Process-local map, nothing is persisted.
    Memory,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "sqlite") {
            Backend::Sqlite
        } else if cfg!(feature = "fjall") {
            Backend::Fjall
        } else {
            Backend::Memory
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Sqlite => "sqlite",
            Backend::Fjall => "fjall",
            Backend::Memory => "memory",
        })
    }
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings, consumed by the `json-kv` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"warn"` or `"json_kv=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Where and how a [`Store`](crate::Store) keeps its entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file (SQLite) or directory (fjall). Ignored by `memory`.
    pub path: PathBuf,
    pub backend: Backend,
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            backend: Backend::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration pointing at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Replace the storage backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    Io(String, std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(toml::de::Error),
}
