//! Configuration management module
//!
//! Holds the benchmark parameters and resolves them from defaults,
//! the optional settings file and user input.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::util::units::{kib_to_bytes, mib_to_bytes, BYTES_PER_MIB};
use crate::{DiskSpeedError, Result, TEMP_FILE_NAME};

pub mod settings;

pub use settings::Settings;

/// Default chunk size in KB
pub const DEFAULT_CHUNK_KB: u64 = 64;

/// Default file size in MB
pub const DEFAULT_FILE_MB: u64 = 1000;

/// Largest chunk size in KB (three digits at the prompt)
pub const MAX_CHUNK_KB: u64 = 999;

/// Largest file size in MB (five digits at the prompt)
pub const MAX_FILE_MB: u64 = 99_999;

/// Benchmark configuration structure containing all test parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Size of each write/read operation (in bytes)
    pub chunk_size: u64,
    /// Total file size for testing (in bytes)
    pub file_size: u64,
    /// Path of the transient benchmark file
    pub target_path: PathBuf,
    /// Whether the write phase flushes the file to the device before it is timed as done
    pub sync_on_write: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            chunk_size: kib_to_bytes(DEFAULT_CHUNK_KB),
            file_size: mib_to_bytes(DEFAULT_FILE_MB),
            target_path: default_target_path(),
            sync_on_write: true,
        }
    }
}

/// `diskspeed.tmp` inside the platform temp directory
pub fn default_target_path() -> PathBuf {
    std::env::temp_dir().join(TEMP_FILE_NAME)
}

impl BenchmarkConfig {
    /// Create a new benchmark configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from defaults overlaid with the settings file
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::default();
        config.configure(settings.chunk_kb, settings.file_mb);
        if let Some(dir) = &settings.target_dir {
            config = config.with_target_dir(dir);
        }
        if let Some(sync) = settings.sync {
            config.sync_on_write = sync;
        }
        config
    }

    /// Set chunk size (KB) and file size (MB) when provided, keeping the
    /// current values otherwise
    pub fn configure(&mut self, chunk_size_kb: Option<u64>, file_size_mb: Option<u64>) {
        if let Some(kb) = chunk_size_kb {
            self.chunk_size = kib_to_bytes(kb);
        }
        if let Some(mb) = file_size_mb {
            self.file_size = mib_to_bytes(mb);
        }
    }

    /// Set the chunk size in bytes
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the total file size in bytes
    pub fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = file_size;
        self
    }

    /// Place the benchmark file inside `dir`
    pub fn with_target_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.target_path = dir.as_ref().join(TEMP_FILE_NAME);
        self
    }

    /// Enable or disable the flush at the end of the write phase
    pub fn with_sync(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Chunk size in KB, as shown to the user
    pub fn chunk_kb(&self) -> u64 {
        self.chunk_size / 1024
    }

    /// File size in MB, as shown to the user
    pub fn file_mb(&self) -> u64 {
        self.file_size / BYTES_PER_MIB
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(DiskSpeedError::ConfigError(
                "Chunk size must be greater than 0".to_string()
            ));
        }

        if self.file_size == 0 {
            return Err(DiskSpeedError::ConfigError(
                "File size must be greater than 0".to_string()
            ));
        }

        // The buffer is allocated in one piece
        if self.chunk_size > kib_to_bytes(MAX_CHUNK_KB) {
            return Err(DiskSpeedError::ConfigError(format!(
                "Chunk size too large: {} bytes (max: {} KB)",
                self.chunk_size, MAX_CHUNK_KB
            )));
        }

        if self.file_size > mib_to_bytes(MAX_FILE_MB) {
            return Err(DiskSpeedError::ConfigError(format!(
                "File size too large: {} bytes (max: {} MB)",
                self.file_size, MAX_FILE_MB
            )));
        }

        let parent = match self.target_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(DiskSpeedError::ConfigError(
                format!("Target directory does not exist: {}", parent.display())
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.chunk_size, 65536);
        assert_eq!(config.file_size, 1_048_576_000);
        assert_eq!(config.target_path, std::env::temp_dir().join("diskspeed.tmp"));
        assert!(config.sync_on_write);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configure_converts_units() {
        let mut config = BenchmarkConfig::new();
        config.configure(Some(32), Some(100));
        assert_eq!(config.chunk_size, 32768);
        assert_eq!(config.file_size, 104_857_600);
        assert_eq!(config.chunk_kb(), 32);
        assert_eq!(config.file_mb(), 100);
    }

    #[test]
    fn test_configure_keeps_values_when_absent() {
        let mut config = BenchmarkConfig::new();
        config.configure(Some(8), None);
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.file_size, 1_048_576_000);

        config.configure(None, Some(5));
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.file_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = BenchmarkConfig::new().with_chunk_size(0);
        assert!(matches!(config.validate(), Err(DiskSpeedError::ConfigError(_))));

        let config = BenchmarkConfig::new().with_file_size(0);
        assert!(matches!(config.validate(), Err(DiskSpeedError::ConfigError(_))));
    }

    #[test]
    fn test_validate_allows_chunk_larger_than_file() {
        let config = BenchmarkConfig::new()
            .with_chunk_size(512 * 1024)
            .with_file_size(1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_size_limits() {
        let mut config = BenchmarkConfig::new();
        config.configure(Some(MAX_CHUNK_KB), Some(MAX_FILE_MB));
        assert!(config.validate().is_ok());

        config.configure(Some(MAX_CHUNK_KB + 1), None);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Chunk size too large"));

        config.configure(Some(MAX_CHUNK_KB), Some(MAX_FILE_MB + 1));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("File size too large"));
    }

    #[test]
    fn test_oversized_settings_are_rejected() {
        let settings = Settings {
            chunk_kb: Some(1_000_000_000),
            file_mb: Some(9_999_999_999),
            ..Settings::default()
        };

        let config = BenchmarkConfig::from_settings(&settings);
        assert!(matches!(config.validate(), Err(DiskSpeedError::ConfigError(_))));

        let settings = Settings {
            file_mb: Some(9_999_999_999),
            ..Settings::default()
        };
        let config = BenchmarkConfig::from_settings(&settings);
        assert!(matches!(config.validate(), Err(DiskSpeedError::ConfigError(_))));
    }

    #[test]
    fn test_validate_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let config = BenchmarkConfig::new().with_target_dir(temp_dir.path().join("missing"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_from_settings() {
        let temp_dir = tempdir().unwrap();
        let settings = Settings {
            chunk_kb: Some(4),
            file_mb: None,
            target_dir: Some(temp_dir.path().to_path_buf()),
            pause: Some(false),
            sync: Some(false),
        };

        let config = BenchmarkConfig::from_settings(&settings);
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.file_size, 1_048_576_000);
        assert_eq!(config.target_path, temp_dir.path().join("diskspeed.tmp"));
        assert!(!config.sync_on_write);
    }
}
