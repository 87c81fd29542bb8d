//! Streaming aggregation over the files of one alert.
//!
//! Files are processed strictly one at a time: a file's report is finalized
//! and handed to the sink before the next file is opened. Each report only
//! holds its own file's findings; [`RunStats`] accumulate across files.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::classifier::{Classification, LineClassifier, ABSENT_FIELD};
use crate::error::{LogError, Result};
use crate::reader::{open_log, Lines};
use crate::types::{AggregationMode, EntryKind, IncidentReport, RunStats};

/// Drives the classifier over log files and collects findings.
#[derive(Debug, Clone)]
pub struct StreamAggregator {
    classifier: LineClassifier,
    mode: AggregationMode,
    stats: RunStats,
}

impl StreamAggregator {
    /// Creates an aggregator with the default classifier.
    #[must_use]
    pub const fn new(mode: AggregationMode) -> Self {
        Self::with_classifier(mode, LineClassifier::new())
    }

    /// Creates an aggregator with a custom classifier.
    #[must_use]
    pub const fn with_classifier(mode: AggregationMode, classifier: LineClassifier) -> Self {
        Self {
            classifier,
            mode,
            stats: RunStats {
                files: 0,
                unreadable_files: 0,
                requests: 0,
                errors: 0,
                high_latency: 0,
            },
        }
    }

    /// The aggregation mode.
    #[must_use]
    pub const fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Aggregates one stream of lines into a finalized report.
    ///
    /// Counters are only merged into the run totals once the whole stream has
    /// been read, so a stream that fails part way leaves them untouched.
    pub fn process_reader<R: BufRead>(&mut self, source: &Path, reader: R) -> Result<IncidentReport> {
        let mut report = IncidentReport::new(source, self.mode);
        let mut counts = RunStats::default();
        let error_kind = self.mode.error_kind();
        let mut lines = Lines::new(reader);

        while let Some(text) = lines.next_line().map_err(|source_err| LogError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })? {
            let Classification::Parsed(line) = self.classifier.classify(&text) else {
                continue;
            };
            counts.requests += 1;

            if line.is(error_kind) {
                counts.errors += 1;
                report.raw_error_lines.push(line.raw.to_string());
                let url = match self.mode {
                    AggregationMode::ClientErrors => line.url.unwrap_or(ABSENT_FIELD).to_string(),
                    AggregationMode::ServerErrorsAndLatency => {
                        line.to_entry(error_kind).summary_line()
                    }
                };
                report.error_urls.push(url);
            }

            if self.mode.tracks_latency() && line.is_high_latency {
                counts.high_latency += 1;
                report
                    .high_latency_entries
                    .push(line.to_entry(EntryKind::HighLatency));
            }
        }

        report.sort_high_latency();
        counts.files = 1;
        self.stats.merge(&counts);
        debug!(
            file = %source.display(),
            requests = counts.requests,
            errors = counts.errors,
            high_latency = counts.high_latency,
            "file aggregated"
        );
        Ok(report)
    }

    /// Opens and aggregates one file.
    pub fn process_file(&mut self, path: &Path) -> Result<IncidentReport> {
        let reader = open_log(path)?;
        self.process_reader(path, reader)
    }

    /// Aggregates files in order, handing each report to `sink` before the
    /// next file is opened.
    ///
    /// An unreadable file is logged, counted and skipped. Only sink errors
    /// stop the run.
    pub fn process_files<P, F, E>(&mut self, files: &[P], mut sink: F) -> std::result::Result<RunStats, E>
    where
        P: AsRef<Path>,
        F: FnMut(&IncidentReport) -> std::result::Result<(), E>,
    {
        for (index, file) in files.iter().enumerate() {
            let path = file.as_ref();
            info!(index, file = %path.display(), mode = %self.mode, "reading file");
            match self.process_file(path) {
                Ok(report) => sink(&report)?,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    self.stats.unreadable_files += 1;
                }
            }
        }
        info!(
            files = self.stats.files,
            requests = self.stats.requests,
            errors = self.stats.errors,
            high_latency = self.stats.high_latency,
            "aggregation done"
        );
        Ok(self.stats)
    }
}
