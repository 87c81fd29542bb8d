//! Run command implementation.
//!
//! Processes every alert in the alert file and prints a summary.

use std::io::Write;
use std::path::{Path, PathBuf};

use slice_config::{Settings, StoreSettings};
use slice_fetch::{AwsCliStore, LocalMirror, RemoteStore};
use slice_report::ManifestArchiver;

use crate::cli::RunArgs;
use crate::commands::{load_inputs, load_settings};
use crate::error::CliError;
use crate::output::{truncate, OutputFormat, TableDisplay};
use crate::pipeline::{AlertOutcome, IncidentPipeline, PipelineOptions, RunSummary};

/// Handler for the run command.
pub struct RunCommand<'a> {
    config: Option<&'a Path>,
}

impl<'a> RunCommand<'a> {
    /// Creates a new run command handler.
    #[must_use]
    pub const fn new(config: Option<&'a Path>) -> Self {
        Self { config }
    }

    /// Executes the run command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings or inputs cannot be loaded. Failures of
    /// individual alerts are part of the summary.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &RunArgs,
    ) -> Result<(), CliError> {
        let mut settings = load_settings(self.config)?;
        apply_overrides(args, &mut settings);
        settings.validate()?;
        let (directory, alerts) = load_inputs(&settings)?;

        let options = PipelineOptions {
            output_dir: settings.output_dir.clone(),
            radius: settings.window_radius(),
            path_rule: settings.path_rule,
            latency_threshold: settings.latency_threshold_secs,
        };
        let store = AnyStore::from_settings(&settings.store);
        let archiver = ManifestArchiver::new(&settings.output_dir);
        let summary = IncidentPipeline::new(&directory, store, archiver, options)
            .run(&alerts)
            .await;

        format.write(out, &summary)
    }
}

fn apply_overrides(args: &RunArgs, settings: &mut Settings) {
    args.source.apply(settings);
    if let Some(dir) = &args.output_dir {
        settings.output_dir.clone_from(dir);
    }
    if let Some(threshold) = args.latency_threshold {
        settings.latency_threshold_secs = threshold;
    }
    if let Some(root) = &args.mirror {
        settings.store = StoreSettings::Local { root: root.clone() };
    } else if let Some(profile) = &args.profile {
        settings.store = StoreSettings::Aws {
            profile: Some(profile.clone()),
        };
    }
}

/// The store selected by the settings.
#[derive(Debug, Clone)]
pub enum AnyStore {
    /// Local bucket mirror.
    Local(LocalMirror),
    /// aws CLI.
    Aws(AwsCliStore),
}

impl AnyStore {
    /// Builds the store described by `settings`.
    #[must_use]
    pub fn from_settings(settings: &StoreSettings) -> Self {
        match settings {
            StoreSettings::Local { root } => Self::Local(LocalMirror::new(root)),
            StoreSettings::Aws { profile } => {
                let store = AwsCliStore::new();
                Self::Aws(match profile {
                    Some(profile) => store.with_profile(profile),
                    None => store,
                })
            }
        }
    }
}

impl RemoteStore for AnyStore {
    async fn list(&self, prefix: &str) -> slice_fetch::Result<Vec<String>> {
        match self {
            Self::Local(store) => store.list(prefix).await,
            Self::Aws(store) => store.list(prefix).await,
        }
    }

    async fn fetch(&self, prefix: &str, name: &str, dest: &Path) -> slice_fetch::Result<PathBuf> {
        match self {
            Self::Local(store) => store.fetch(prefix, name, dest).await,
            Self::Aws(store) => store.fetch(prefix, name, dest).await,
        }
    }
}

impl TableDisplay for RunSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.alerts.is_empty() {
            writeln!(writer, "No alerts")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<10}  {:<12}  {:<40}  {:>5}  {:>9}  {:>7}  {:>7}",
            "STATUS", "CLIENT", "FOLDER / REASON", "FILES", "REQUESTS", "ERRORS", "SLOW"
        )?;
        writeln!(writer, "{}", "─".repeat(102))?;

        for outcome in &self.alerts {
            match outcome {
                AlertOutcome::Processed(p) => {
                    let folder = p
                        .folder
                        .file_name()
                        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
                    writeln!(
                        writer,
                        "{:<10}  {:<12}  {:<40}  {:>5}  {:>9}  {:>7}  {:>7}",
                        "processed",
                        truncate(&p.client, 12),
                        truncate(&folder, 40),
                        p.files,
                        p.stats.requests,
                        p.stats.errors,
                        p.stats.high_latency
                    )?;
                }
                AlertOutcome::Skipped { reason, .. } => {
                    writeln!(
                        writer,
                        "{:<10}  {:<12}  {}",
                        "skipped",
                        "-",
                        truncate(reason, 78)
                    )?;
                }
            }
        }

        let totals = self.totals();
        writeln!(writer)?;
        writeln!(
            writer,
            "Processed: {}  Skipped: {}  Requests: {}  Errors: {} ({:.2}%)  Slow: {}",
            self.processed(),
            self.skipped(),
            totals.requests,
            totals.errors,
            totals.error_rate() * 100.0,
            totals.high_latency
        )?;
        Ok(())
    }
}
