//! Resolve command implementation.
//!
//! Prints, for each alert, the client, remote path and window the run command
//! would use. Nothing is fetched or written.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use slice_alerts::WindowResolver;

use crate::cli::ResolveArgs;
use crate::commands::{load_inputs, load_settings};
use crate::error::CliError;
use crate::output::{truncate, OutputFormat, TableDisplay};

/// Handler for the resolve command.
pub struct ResolveCommand<'a> {
    config: Option<&'a Path>,
}

impl<'a> ResolveCommand<'a> {
    /// Creates a new resolve command handler.
    #[must_use]
    pub const fn new(config: Option<&'a Path>) -> Self {
        Self { config }
    }

    /// Executes the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs cannot be loaded. Alerts that fail to
    /// resolve are reported in the output, not as an error.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ResolveArgs,
    ) -> Result<(), CliError> {
        let mut settings = load_settings(self.config)?;
        args.source.apply(&mut settings);
        settings.validate()?;
        let (directory, alerts) = load_inputs(&settings)?;

        let resolver = WindowResolver::new(&directory)
            .with_path_rule(settings.path_rule)
            .with_radius(settings.window_radius());

        let rows = alerts
            .iter()
            .map(|alert| match resolver.resolve(alert) {
                Ok(resolved) => ResolveRow {
                    subject: alert.subject.clone(),
                    ignored: alert.ignore,
                    client: Some(resolved.client_key),
                    remote_path: Some(resolved.remote_path),
                    window: Some(resolved.window.to_string()),
                    folder: Some(resolved.folder_name),
                    error: None,
                },
                Err(e) => ResolveRow {
                    subject: alert.subject.clone(),
                    ignored: alert.ignore,
                    client: None,
                    remote_path: None,
                    window: None,
                    folder: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        format.write(out, &ResolveOutput { alerts: rows })
    }
}

// Output types

/// Resolve output.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutput {
    /// One row per alert.
    pub alerts: Vec<ResolveRow>,
}

/// One resolved (or unresolvable) alert.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveRow {
    /// Alert subject.
    pub subject: String,
    /// Whether the alert is flagged ignore.
    pub ignored: bool,
    /// Matched client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Remote prefix for the alert's day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    /// Incident window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    /// Incident folder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Resolution failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableDisplay for ResolveOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.alerts.is_empty() {
            writeln!(writer, "No alerts")?;
            return Ok(());
        }

        for row in &self.alerts {
            let marker = if row.ignored { " (ignored)" } else { "" };
            writeln!(writer, "{}{marker}", truncate(&row.subject, 72))?;
            match &row.error {
                Some(error) => writeln!(writer, "  error:   {error}")?,
                None => {
                    let dash = "-".to_string();
                    writeln!(writer, "  client:  {}", row.client.as_ref().unwrap_or(&dash))?;
                    writeln!(writer, "  path:    {}", row.remote_path.as_ref().unwrap_or(&dash))?;
                    writeln!(writer, "  window:  {}", row.window.as_ref().unwrap_or(&dash))?;
                    writeln!(writer, "  folder:  {}", row.folder.as_ref().unwrap_or(&dash))?;
                }
            }
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} alert(s)", self.alerts.len())?;
        Ok(())
    }
}
