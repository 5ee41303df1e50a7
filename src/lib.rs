//! diskspeed - sequential disk throughput benchmark
//!
//! Writes a temporary file in fixed-size chunks, reads it back and
//! reports the elapsed time and throughput of both phases.

use std::fmt;
use std::path::PathBuf;

pub mod bench;
pub mod config;
pub mod io;
pub mod models;
pub mod pause;
pub mod simple;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum DiskSpeedError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// I/O operation on the target file failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Permission denied for disk operations
    PermissionDenied(String),
    /// Configuration validation or parsing error
    ConfigError(String),
    /// Malformed size input from the user
    InvalidInput(String),
    /// The run was interrupted by the user
    Aborted,
    /// Console interaction error
    ConsoleError(String),
    /// Background task failed or panicked
    WorkerError(String),
}

impl DiskSpeedError {
    /// Wrap an I/O error together with the file it concerns
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiskSpeedError::FileError {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for DiskSpeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskSpeedError::IoError(err) => write!(f, "I/O error: {}", err),
            DiskSpeedError::FileError { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            DiskSpeedError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            DiskSpeedError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DiskSpeedError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DiskSpeedError::Aborted => write!(f, "Program aborted"),
            DiskSpeedError::ConsoleError(msg) => write!(f, "Console error: {}", msg),
            DiskSpeedError::WorkerError(msg) => write!(f, "Worker error: {}", msg),
        }
    }
}

impl std::error::Error for DiskSpeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskSpeedError::IoError(err) => Some(err),
            DiskSpeedError::FileError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiskSpeedError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                DiskSpeedError::PermissionDenied(format!("Access denied: {}", err))
            }
            _ => DiskSpeedError::IoError(err),
        }
    }
}

impl From<tokio::task::JoinError> for DiskSpeedError {
    fn from(err: tokio::task::JoinError) -> Self {
        DiskSpeedError::WorkerError(format!("benchmark task failed: {}", err))
    }
}

impl From<serde_json::Error> for DiskSpeedError {
    fn from(err: serde_json::Error) -> Self {
        DiskSpeedError::ConsoleError(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for DiskSpeedError {
    fn from(err: toml::de::Error) -> Self {
        DiskSpeedError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

/// Result type alias for diskspeed operations
pub type Result<T> = std::result::Result<T, DiskSpeedError>;

/// Error handling utilities
pub mod error {
    use super::DiskSpeedError;

    /// True when the error stands for a user interrupt rather than a failure
    pub fn is_user_abort(error: &DiskSpeedError) -> bool {
        matches!(error, DiskSpeedError::Aborted)
    }

    /// Process exit code for the outcome of a run
    pub fn exit_code(outcome: &super::Result<()>) -> i32 {
        match outcome {
            Ok(()) => 0,
            Err(err) if is_user_abort(err) => 0,
            Err(_) => 1,
        }
    }

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &DiskSpeedError) -> String {
        match error {
            DiskSpeedError::PermissionDenied(_) => {
                "Permission denied. Choose another target directory or check file permissions."
                    .to_string()
            }
            DiskSpeedError::FileError { path, source } => format!(
                "Benchmark file {} failed: {}. Check disk space and permissions.",
                path.display(),
                source
            ),
            DiskSpeedError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            DiskSpeedError::Aborted => "Program aborted.".to_string(),
            _ => error.to_string(),
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "diskspeed";
pub const CONFIG_FILE: &str = "diskspeed.toml";
pub const TEMP_FILE_NAME: &str = "diskspeed.tmp";
