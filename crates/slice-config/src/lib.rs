//! Settings for logslice runs.
//!
//! Settings are a single JSON document; every field has a default, so `{}` is
//! a valid (if not very useful) settings file. Relative paths are taken
//! relative to the directory holding the settings file.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use slice_alerts::{AlertError, ClientDirectory, PathRule, DEFAULT_WINDOW_MINUTES};
use slice_logs::DEFAULT_LATENCY_THRESHOLD_SECS;
use thiserror::Error;
use tracing::debug;

/// Largest accepted window radius, one day.
pub const MAX_WINDOW_MINUTES: i64 = 24 * 60;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`Settings`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A setting is out of range or missing.
    #[error("invalid settings: {0}")]
    Invalid(String),

    /// The client directory named by the settings could not be loaded.
    #[error(transparent)]
    Directory(#[from] AlertError),
}

/// Where log files are listed and downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreSettings {
    /// A local directory laid out like the bucket.
    Local {
        /// Mirror root; `s3://bucket/a/` maps to `<root>/bucket/a/`.
        root: PathBuf,
    },
    /// The `aws` command line tool.
    Aws {
        /// Named profile passed as `--profile`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile: Option<String>,
    },
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::Aws { profile: None }
    }
}

/// Settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Client directory JSON.
    pub client_map: Option<PathBuf>,
    /// Alert source JSON.
    pub alerts: Option<PathBuf>,
    /// Root for incident folders and reports.
    pub output_dir: PathBuf,
    /// Window radius in minutes.
    pub window_minutes: i64,
    /// Requests slower than this are high latency (strictly greater).
    pub latency_threshold_secs: f64,
    /// Category to log family mapping.
    pub path_rule: PathRule,
    /// Remote store.
    pub store: StoreSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_map: None,
            alerts: None,
            output_dir: PathBuf::from("incidents"),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            latency_threshold_secs: DEFAULT_LATENCY_THRESHOLD_SECS,
            path_rule: PathRule::default(),
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    /// Loads and validates settings from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Self = serde_json::from_str(&body).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            settings.rebase(base);
        }
        settings.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_MINUTES).contains(&self.window_minutes) {
            return Err(ConfigError::Invalid(format!(
                "window_minutes must be between 1 and {MAX_WINDOW_MINUTES}, got {}",
                self.window_minutes
            )));
        }
        if !self.latency_threshold_secs.is_finite() || self.latency_threshold_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "latency_threshold_secs must be a non-negative number, got {}",
                self.latency_threshold_secs
            )));
        }
        Ok(())
    }

    /// The window radius.
    #[must_use]
    pub fn window_radius(&self) -> Duration {
        Duration::minutes(self.window_minutes)
    }

    /// Loads the client directory named by `client_map`.
    pub fn load_client_directory(&self) -> Result<ClientDirectory> {
        let path = self
            .client_map
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("client_map is not set".to_string()))?;
        Ok(ClientDirectory::load(path)?)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.client_map.as_mut() {
            join(p);
        }
        if let Some(p) = self.alerts.as_mut() {
            join(p);
        }
        join(&mut self.output_dir);
        if let StoreSettings::Local { root } = &mut self.store {
            join(root);
        }
    }
}
