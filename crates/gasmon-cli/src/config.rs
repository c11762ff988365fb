//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gasmon_core::SnapshotFormat;
use gasmon_types::TODAY_CAPACITY;
use serde::{Deserialize, Serialize};

/// Persistent CLI settings, stored as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; the platform data directory is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Number of readings kept in today's log
    pub today_cap: usize,

    /// Directory snapshots are written to; the current directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Default snapshot format
    pub export_format: SnapshotFormat,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            today_cap: TODAY_CAPACITY,
            export_dir: None,
            export_format: SnapshotFormat::Json,
            no_color: false,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gasmon")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, falling back to defaults with a warning
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the database path: explicit flag or env var, then config, then
/// the platform default.
pub fn resolve_database(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.database.clone())
        .unwrap_or_else(gasmon_store::default_db_path)
}

/// Resolve the snapshot directory: explicit flag, then config, then the
/// current directory.
pub fn resolve_export_dir(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.export_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
