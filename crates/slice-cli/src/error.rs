//! CLI error types.

use std::fmt;

use slice_alerts::AlertError;
use slice_config::ConfigError;
use slice_fetch::FetchError;
use slice_logs::LogError;
use slice_report::ReportError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or missing settings.
    Config(String),
    /// The alert source or client directory could not be used.
    Input(String),
    /// Listing or downloading log files failed.
    Fetch(String),
    /// Reading log files failed.
    Logs(String),
    /// Writing reports or manifests failed.
    Report(String),
    /// Output formatting error.
    Format(String),
    /// Invalid argument.
    InvalidArgument(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Input(msg) => write!(f, "input error: {msg}"),
            Self::Fetch(msg) => write!(f, "fetch error: {msg}"),
            Self::Logs(msg) => write!(f, "log error: {msg}"),
            Self::Report(msg) => write!(f, "report error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<AlertError> for CliError {
    fn from(err: AlertError) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<LogError> for CliError {
    fn from(err: LogError) -> Self {
        Self::Logs(err.to_string())
    }
}

impl From<ReportError> for CliError {
    fn from(err: ReportError) -> Self {
        Self::Report(err.to_string())
    }
}
