// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! Merge configuration, resolved once and handed to [`crate::Merger`].
//!
//! Stored as JSON. Every field is optional; missing ones take their
//! defaults, so `{}` is a valid config.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::DiffOptions;
use crate::race::RaceCheck;

const APP_NAME: &str = "fmtmerge";
const CONFIG_FILENAME: &str = "config.json";

/// Settings for a [`crate::Merger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub race_check: RaceCheck,
    pub diff: DiffOptions,
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid merge config")]
    Parse(#[from] serde_json::Error),
    #[error("failed to serialize merge config")]
    Serialize(#[source] serde_json::Error),
}

// =============================================================================
// Loading
// =============================================================================

impl MergeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the config at [`MergeConfig::default_path`], falling back to
    /// defaults when there is no config dir or no file in it.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/fmtmerge/config.json`, e.g.
    /// `~/.config/fmtmerge/config.json` on Linux.
    ///
    /// Returns `None` if the platform has no config directory. Nothing is
    /// created on disk.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_NAME).join(CONFIG_FILENAME))
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}
