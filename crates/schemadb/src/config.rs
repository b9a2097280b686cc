//! Record store configuration

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the record store
///
/// ```yaml
/// storage:
///   type: file
///   path: /var/lib/schemadb/schemas
/// compression_level: 6
/// cache:
///   refresh_on_create: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Schema storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Gzip level for persisted schemas (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Schema cache behaviour
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_compression_level() -> u32 {
    6
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            compression_level: default_compression_level(),
            cache: CacheConfig::default(),
        }
    }
}

impl DbConfig {
    /// Create config with in-memory schema storage
    pub fn memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            ..Default::default()
        }
    }

    /// Create config persisting schemas under `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::File { path: path.into() },
            ..Default::default()
        }
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> DbResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Load a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DbError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text)
    }

    /// Override the storage directory
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = StorageConfig::File { path: path.into() };
        self
    }

    /// Set the gzip level
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Drop cached definitions when a schema is re-created
    pub fn with_refresh_on_create(mut self, refresh: bool) -> Self {
        self.cache.refresh_on_create = refresh;
        self
    }

    /// Reject values that cannot be used
    pub fn validate(&self) -> DbResult<()> {
        if self.compression_level > 9 {
            return Err(DbError::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        if let StorageConfig::File { path } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(DbError::Config("storage path cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Schema storage backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (lost on exit)
    Memory,

    /// One file per schema under `path`
    File { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            path: PathBuf::from("schemas"),
        }
    }
}

/// Schema cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Invalidate the cached definition of a schema after it is re-created.
    ///
    /// Off by default: a cached schema keeps serving its first loaded definition for
    /// the lifetime of the process.
    #[serde(default)]
    pub refresh_on_create: bool,
}
