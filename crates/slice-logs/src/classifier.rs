//! Per-line classification.
//!
//! [`LineClassifier::classify`] is pure: the same line always yields the same
//! result and nothing outside the return value is touched.

use crate::shape::LogLine;
use crate::types::{ClassifiedEntry, EntryKind};

/// Latency above which a request is flagged, in seconds.
pub const DEFAULT_LATENCY_THRESHOLD_SECS: f64 = 2.0;

/// Placeholder written for a field the line does not have.
pub const ABSENT_FIELD: &str = "-";

/// A non-comment line with its classification flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// The original text.
    pub raw: &'a str,
    /// Request timestamp, if present.
    pub request_time: Option<&'a str>,
    /// Request URL, if present.
    pub url: Option<&'a str>,
    /// Status code, if present.
    pub status_code: Option<&'a str>,
    /// Summed latency in seconds.
    pub time_taken: f64,
    /// Status code starts with `4`.
    pub is_error_4xx: bool,
    /// Status code starts with `5`.
    pub is_error_5xx: bool,
    /// Time taken above the threshold.
    pub is_high_latency: bool,
}

impl ParsedLine<'_> {
    /// The kinds this line was flagged as, possibly none.
    pub fn kinds(&self) -> impl Iterator<Item = EntryKind> + '_ {
        [
            (self.is_error_4xx, EntryKind::Error4xx),
            (self.is_error_5xx, EntryKind::Error5xx),
            (self.is_high_latency, EntryKind::HighLatency),
        ]
        .into_iter()
        .filter_map(|(flag, kind)| flag.then_some(kind))
    }

    /// Returns true if the line carries the given flag.
    #[must_use]
    pub const fn is(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Error4xx => self.is_error_4xx,
            EntryKind::Error5xx => self.is_error_5xx,
            EntryKind::HighLatency => self.is_high_latency,
        }
    }

    /// Builds an owned entry of the given kind.
    #[must_use]
    pub fn to_entry(&self, kind: EntryKind) -> ClassifiedEntry {
        ClassifiedEntry {
            kind,
            request_time: self.request_time.unwrap_or(ABSENT_FIELD).to_string(),
            url: self.url.unwrap_or(ABSENT_FIELD).to_string(),
            time_taken: self.time_taken,
            status_code: self.status_code.unwrap_or(ABSENT_FIELD).to_string(),
        }
    }
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Comment line, not a request.
    Skip,
    /// A request line.
    Parsed(ParsedLine<'a>),
}

impl<'a> Classification<'a> {
    /// Returns the parsed line, if any.
    #[must_use]
    pub const fn parsed(&self) -> Option<&ParsedLine<'a>> {
        match self {
            Self::Skip => None,
            Self::Parsed(line) => Some(line),
        }
    }
}

/// Classifies access-log lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineClassifier {
    latency_threshold: f64,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    /// Creates a classifier with the 2 second threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latency_threshold: DEFAULT_LATENCY_THRESHOLD_SECS,
        }
    }

    /// Creates a classifier with a custom latency threshold.
    #[must_use]
    pub const fn with_latency_threshold(threshold: f64) -> Self {
        Self {
            latency_threshold: threshold,
        }
    }

    /// The latency threshold in seconds.
    #[must_use]
    pub const fn latency_threshold(&self) -> f64 {
        self.latency_threshold
    }

    /// Classifies one line.
    #[must_use]
    pub fn classify<'a>(&self, line: &'a str) -> Classification<'a> {
        if LogLine::is_comment(line) {
            return Classification::Skip;
        }

        let shape = LogLine::split(line);
        let status_code = shape.status_code();
        let leading = status_code.and_then(|s| s.chars().next());
        let time_taken = shape.time_taken();

        Classification::Parsed(ParsedLine {
            raw: line,
            request_time: shape.request_time(),
            url: shape.url(),
            status_code,
            time_taken,
            is_error_4xx: leading == Some('4'),
            is_error_5xx: leading == Some('5'),
            is_high_latency: time_taken > self.latency_threshold,
        })
    }
}
