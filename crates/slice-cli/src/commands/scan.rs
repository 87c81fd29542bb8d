//! Scan command implementation.
//!
//! Classifies every file already present in a folder and writes the folder's
//! reports. No listing, download or pruning happens.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use slice_logs::{AggregationMode, LineClassifier, RunStats, StreamAggregator};
use slice_report::ReportWriter;

use crate::cli::ScanArgs;
use crate::commands::load_settings;
use crate::error::CliError;
use crate::output::{OutputFormat, TableDisplay};

/// Handler for the scan command.
pub struct ScanCommand<'a> {
    config: Option<&'a Path>,
}

impl<'a> ScanCommand<'a> {
    /// Creates a new scan command handler.
    #[must_use]
    pub const fn new(config: Option<&'a Path>) -> Self {
        Self { config }
    }

    /// Executes the scan command.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be listed or reports cannot be
    /// written.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ScanArgs,
    ) -> Result<(), CliError> {
        let mut settings = load_settings(self.config)?;
        if let Some(threshold) = args.latency_threshold {
            settings.latency_threshold_secs = threshold;
        }
        settings.validate()?;

        if !args.dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "{} is not a directory",
                args.dir.display()
            )));
        }
        let files = list_files(&args.dir)?;

        let mode = AggregationMode::from(args.mode);
        let classifier = LineClassifier::with_latency_threshold(settings.latency_threshold_secs);
        let mut aggregator = StreamAggregator::with_classifier(mode, classifier);
        let mut writer = ReportWriter::begin(&args.dir, mode)?;
        let stats = aggregator.process_files(&files, |report| writer.write(report))?;

        let output = ScanOutput {
            dir: args.dir.clone(),
            mode,
            files: files.len(),
            stats,
            reports: writer.finish(),
        };
        format.write(out, &output)
    }
}

/// Regular files directly under `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

// Output types

/// Scan output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    /// Folder scanned.
    pub dir: PathBuf,
    /// Mode used.
    pub mode: AggregationMode,
    /// Files found.
    pub files: usize,
    /// Counters.
    pub stats: RunStats,
    /// Report files written.
    pub reports: Vec<PathBuf>,
}

impl TableDisplay for ScanOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Scan of {} ({})", self.dir.display(), self.mode)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Files:          {}", self.files)?;
        writeln!(writer, "Unreadable:     {}", self.stats.unreadable_files)?;
        writeln!(writer, "Requests:       {}", self.stats.requests)?;
        writeln!(writer, "Errors:         {}", self.stats.errors)?;
        if self.mode.tracks_latency() {
            writeln!(writer, "Slow requests:  {}", self.stats.high_latency)?;
        }
        writeln!(writer)?;
        if self.reports.is_empty() {
            writeln!(writer, "No reports written")?;
        } else {
            writeln!(writer, "Reports")?;
            for report in &self.reports {
                writeln!(writer, "  {}", report.display())?;
            }
        }
        Ok(())
    }
}
