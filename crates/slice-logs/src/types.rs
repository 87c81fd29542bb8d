//! Core types for classification and aggregation.
//!
//! - [`EntryKind`]: what a classified line was flagged as
//! - [`ClassifiedEntry`]: one flagged request
//! - [`AggregationMode`]: which error class a run records
//! - [`IncidentReport`]: per-file findings
//! - [`RunStats`]: counters across every file of one alert

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Classification result for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Status code starting with `4`.
    Error4xx,
    /// Status code starting with `5`.
    Error5xx,
    /// Time taken above the latency threshold.
    HighLatency,
}

impl EntryKind {
    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error4xx => "error_4xx",
            Self::Error5xx => "error_5xx",
            Self::HighLatency => "high_latency",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request flagged by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    /// What the entry was flagged as.
    pub kind: EntryKind,
    /// Request timestamp as written in the log.
    pub request_time: String,
    /// Request URL.
    pub url: String,
    /// Summed latency in seconds.
    pub time_taken: f64,
    /// Status code as written in the log.
    pub status_code: String,
}

impl ClassifiedEntry {
    /// Renders `"<requestTime> : <url> <timeTaken>s <statusCode>"`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} : {} {}s {}",
            self.request_time, self.url, self.time_taken, self.status_code
        )
    }
}

/// Orders high-latency entries: slowest first, then request time descending.
///
/// The tie-break compares request times as strings, not as instants.
#[must_use]
pub fn high_latency_order(a: &ClassifiedEntry, b: &ClassifiedEntry) -> Ordering {
    b.time_taken
        .total_cmp(&a.time_taken)
        .then_with(|| b.request_time.cmp(&a.request_time))
}

/// Which error class an aggregation run records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationMode {
    /// Record 4xx lines; URLs are kept bare.
    #[serde(rename = "4xx")]
    ClientErrors,
    /// Record 5xx lines with summary URLs, plus every high-latency line.
    #[serde(rename = "5xx")]
    ServerErrorsAndLatency,
}

impl AggregationMode {
    /// The error kind this mode records.
    #[must_use]
    pub const fn error_kind(&self) -> EntryKind {
        match self {
            Self::ClientErrors => EntryKind::Error4xx,
            Self::ServerErrorsAndLatency => EntryKind::Error5xx,
        }
    }

    /// Whether high-latency lines are recorded.
    #[must_use]
    pub const fn tracks_latency(&self) -> bool {
        matches!(self, Self::ServerErrorsAndLatency)
    }

    /// Returns the mode as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClientErrors => "4xx",
            Self::ServerErrorsAndLatency => "5xx",
        }
    }
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Findings for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// File the findings came from.
    pub source: PathBuf,
    /// Mode the file was aggregated in.
    pub mode: AggregationMode,
    /// Offending lines, verbatim.
    pub raw_error_lines: Vec<String>,
    /// Offending URLs (bare in 4xx mode, summary lines in 5xx mode).
    pub error_urls: Vec<String>,
    /// High-latency entries, sorted by [`high_latency_order`] once finalized.
    pub high_latency_entries: Vec<ClassifiedEntry>,
}

impl IncidentReport {
    /// Creates an empty report for `source`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, mode: AggregationMode) -> Self {
        Self {
            source: source.into(),
            mode,
            raw_error_lines: Vec::new(),
            error_urls: Vec::new(),
            high_latency_entries: Vec::new(),
        }
    }

    /// The source file.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns true if nothing was flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_error_lines.is_empty()
            && self.error_urls.is_empty()
            && self.high_latency_entries.is_empty()
    }

    /// Sorts the high-latency bucket.
    pub fn sort_high_latency(&mut self) {
        self.high_latency_entries.sort_by(high_latency_order);
    }

    /// High-latency entries rendered as summary lines.
    #[must_use]
    pub fn high_latency_lines(&self) -> Vec<String> {
        self.high_latency_entries
            .iter()
            .map(ClassifiedEntry::summary_line)
            .collect()
    }
}

/// Counters accumulated across the files of one alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Files fully processed.
    pub files: u64,
    /// Files that could not be read.
    pub unreadable_files: u64,
    /// Non-comment lines seen.
    pub requests: u64,
    /// Lines recorded as errors of the active class.
    pub errors: u64,
    /// Lines recorded as high latency.
    pub high_latency: u64,
}

impl RunStats {
    /// Adds another set of counters.
    pub fn merge(&mut self, other: &Self) {
        self.files += other.files;
        self.unreadable_files += other.unreadable_files;
        self.requests += other.requests;
        self.errors += other.errors;
        self.high_latency += other.high_latency;
    }

    /// Errors as a fraction of requests (0 when there were none).
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.errors as f64 / self.requests as f64
        }
    }
}
