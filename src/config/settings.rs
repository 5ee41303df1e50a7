//! Optional settings file
//!
//! Supplies defaults for the prompts from
//! `$CONFIG_HOME/diskspeed/diskspeed.toml`. Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::{DiskSpeedError, Result, APP_NAME, CONFIG_FILE};

/// User settings loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default chunk size in KB
    pub chunk_kb: Option<u64>,
    /// Default file size in MB
    pub file_mb: Option<u64>,
    /// Directory for the benchmark file
    pub target_dir: Option<PathBuf>,
    /// Wait for a key press before exiting
    pub pause: Option<bool>,
    /// Flush the file to the device at the end of the write phase
    pub sync: Option<bool>,
}

impl Settings {
    /// Get the standard settings file path
    /// Uses $CONFIG_HOME/diskspeed/diskspeed.toml
    pub fn settings_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DiskSpeedError::ConfigError(
                "Unable to determine config directory".to_string()
            ))?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load settings from the standard location, or defaults when absent
    pub fn load() -> Result<Self> {
        match Self::settings_file_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                log::debug!("{}; using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(DiskSpeedError::ConfigError(
                    format!("Failed to read settings file {}: {}", path.display(), e)
                ))
            }
        };

        let settings: Self = toml::from_str(&content)
            .map_err(|e| DiskSpeedError::ConfigError(
                format!("Failed to parse settings file {}: {}", path.display(), e)
            ))?;

        log::debug!("loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Whether the end-of-run pause is enabled (default: yes)
    pub fn pause_enabled(&self) -> bool {
        self.pause.unwrap_or(true)
    }
}
