//! Error types for remote listing and fetching.

use thiserror::Error;

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while listing, fetching or pruning log files.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote store could not be reached or refused the request.
    #[error("transport error during {operation}: {message}")]
    Transport {
        /// `list` or `fetch`.
        operation: &'static str,
        /// Additional context about the error.
        message: String,
    },

    /// A remote prefix or file name cannot be mapped to a safe local path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A local filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Builds a transport error for a listing failure.
    pub fn list(message: impl Into<String>) -> Self {
        Self::Transport {
            operation: "list",
            message: message.into(),
        }
    }

    /// Builds a transport error for a download failure.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Transport {
            operation: "fetch",
            message: message.into(),
        }
    }

    /// Returns true for remote store failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
