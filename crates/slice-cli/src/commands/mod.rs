//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`run`] - Fetch, classify and report a batch of alerts
//! - [`resolve`] - Show where and when each alert would be looked at
//! - [`scan`] - Classify a folder that is already on disk

pub mod resolve;
pub mod run;
pub mod scan;

pub use resolve::ResolveCommand;
pub use run::RunCommand;
pub use scan::ScanCommand;

use std::path::Path;

use slice_alerts::{load_alerts, AlertRecord, ClientDirectory};
use slice_config::Settings;
use tracing::debug;

use crate::cli::SourceArgs;
use crate::error::CliError;

/// Loads settings from `path`, or the defaults when no file was given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => {
            debug!("no settings file, using defaults");
            Ok(Settings::default())
        }
    }
}

impl SourceArgs {
    /// Applies command line overrides to `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(alerts) = &self.alerts {
            settings.alerts = Some(alerts.clone());
        }
        if let Some(client_map) = &self.client_map {
            settings.client_map = Some(client_map.clone());
        }
        if let Some(minutes) = self.window_minutes {
            settings.window_minutes = minutes;
        }
        if let Some(rule) = self.path_rule {
            settings.path_rule = rule.into();
        }
    }
}

/// Loads the client directory and the alerts named by `settings`.
///
/// # Errors
///
/// Returns an error if either input is missing or unreadable.
pub fn load_inputs(settings: &Settings) -> Result<(ClientDirectory, Vec<AlertRecord>), CliError> {
    let directory = settings.load_client_directory()?;
    let alerts_path = settings
        .alerts
        .as_deref()
        .ok_or_else(|| CliError::Config("alerts file is not set".into()))?;
    let alerts = load_alerts(alerts_path)?;
    debug!(
        clients = directory.len(),
        alerts = alerts.len(),
        "loaded inputs"
    );
    Ok((directory, alerts))
}
