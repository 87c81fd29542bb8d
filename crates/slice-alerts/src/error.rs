//! Error types for alert resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

/// Errors raised while loading or resolving an alert.
///
/// `InvalidDate`, `ClientNotMatched` and `PathNotConfigured` are fatal to a
/// single alert only; callers skip that alert and continue the batch.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The alert's date (or time of day) could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// No client key or alias appears in the alert subject.
    #[error("client key not matched from subject: {subject}")]
    ClientNotMatched {
        /// The subject that was tokenized.
        subject: String,
    },

    /// The matched client has no storage path for the alert category.
    #[error("storage path not defined for {category} and client {client}")]
    PathNotConfigured {
        /// Matched client key.
        client: String,
        /// Alert category that selected the path.
        category: String,
    },

    /// An alert or directory document could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An alert or directory document is not valid JSON for its schema.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = AlertError::InvalidDate("2024-13-45".to_string());
        assert_eq!(err.to_string(), "invalid date: 2024-13-45");

        let err = AlertError::ClientNotMatched {
            subject: "ALERT - nobody".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "client key not matched from subject: ALERT - nobody"
        );

        let err = AlertError::PathNotConfigured {
            client: "ACME".to_string(),
            category: "5XX".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "storage path not defined for 5XX and client ACME"
        );
    }

    #[test]
    fn error_io_includes_path() {
        let err = AlertError::Io {
            path: PathBuf::from("alert.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("alert.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AlertError>();
    }
}
