//! Configuration management with layered hierarchy
//!
//! Sources, lowest to highest priority: built-in defaults, the global
//! `config.yaml`, `QMT_*` environment variables, then command-line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::IdStrategy;
use crate::core::persistence::{
    KeyValueStore, PersistenceBridge, StorageBackend, StorageError, DEFAULT_STORAGE_KEY,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },
}

/// qmt configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author/owner for new records
    pub author: Option<String>,

    /// Directory holding the persisted state
    pub data_dir: Option<PathBuf>,

    /// Storage backend (json or sqlite)
    pub backend: Option<StorageBackend>,

    /// Key the snapshot is stored under
    pub storage_key: Option<String>,

    /// How new record ids are generated
    pub id_strategy: Option<IdStrategy>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// A broken layer is reported and skipped; loading itself never fails.
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/qmt/config.yaml or $QMT_CONFIG)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match Self::from_file(&global_path) {
                    Ok(global) => config.merge(global),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
        }

        // 3. Environment variables
        match Self::from_env(|var| std::env::var(var).ok()) {
            Ok(env) => config.merge(env),
            Err(e) => tracing::warn!("{}", e),
        }

        config
    }

    /// Parse a single YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the `QMT_*` variables through `lookup`
    pub fn from_env<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config {
            author: lookup("QMT_AUTHOR"),
            data_dir: lookup("QMT_DATA_DIR").map(PathBuf::from),
            storage_key: lookup("QMT_STORAGE_KEY"),
            ..Default::default()
        };
        if let Some(backend) = lookup("QMT_BACKEND") {
            config.backend = Some(backend.parse().map_err(|message| ConfigError::Env {
                var: "QMT_BACKEND",
                message,
            })?);
        }
        if let Some(strategy) = lookup("QMT_ID_STRATEGY") {
            config.id_strategy = Some(strategy.parse().map_err(|message| ConfigError::Env {
                var: "QMT_ID_STRATEGY",
                message,
            })?);
        }
        Ok(config)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("QMT_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "qmt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.storage_key.is_some() {
            self.storage_key = other.storage_key;
        }
        if other.id_strategy.is_some() {
            self.id_strategy = other.id_strategy;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        // Fall back to username
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Data directory, defaulting to the platform data dir (or `./.qmt`)
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "qmt")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".qmt"))
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend.unwrap_or_default()
    }

    pub fn storage_key(&self) -> String {
        self.storage_key
            .clone()
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string())
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy.unwrap_or_default()
    }

    /// Open the configured backend in the configured data directory
    pub fn open_backend(&self) -> Result<Box<dyn KeyValueStore>, StorageError> {
        self.backend().open(&self.data_dir())
    }

    /// Persistence bridge for the configured backend and key
    pub fn bridge(&self) -> Result<PersistenceBridge, StorageError> {
        Ok(PersistenceBridge::new(self.open_backend()?, self.storage_key()))
    }
}
