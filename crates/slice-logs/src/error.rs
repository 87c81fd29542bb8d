//! Error types for log reading.
//!
//! Malformed lines are never errors; only failing to open or read a file is.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while streaming a log file.
#[derive(Debug, Error)]
pub enum LogError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading (or decompressing) the file failed part way.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
