//! Positional shape of an access-log line.
//!
//! Lines are space-delimited with no quoting. Only the positions below are
//! read; a format change is an edit to these constants.

/// Request timestamp.
pub const REQUEST_TIME: usize = 1;
/// Time spent before the request reached the target.
pub const REQUEST_PROCESSING_TIME: usize = 5;
/// Time the target took to respond.
pub const TARGET_PROCESSING_TIME: usize = 6;
/// Time spent sending the response.
pub const RESPONSE_PROCESSING_TIME: usize = 7;
/// Status code returned by the load balancer.
pub const STATUS_CODE: usize = 8;
/// Request URL (second word of the quoted request field).
pub const REQUEST_URL: usize = 13;

/// Fields summed into the request's time taken.
pub const LATENCY_FIELDS: [usize; 3] = [
    REQUEST_PROCESSING_TIME,
    TARGET_PROCESSING_TIME,
    RESPONSE_PROCESSING_TIME,
];

/// A borrowed, split access-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    raw: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> LogLine<'a> {
    /// Returns true for comment lines (first character `#`).
    #[must_use]
    pub fn is_comment(raw: &str) -> bool {
        raw.starts_with('#')
    }

    /// Splits a line on single spaces.
    #[must_use]
    pub fn split(raw: &'a str) -> Self {
        Self {
            raw,
            fields: raw.split(' ').collect(),
        }
    }

    /// The original text.
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        self.raw
    }

    /// Field at `index`, if present.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    /// Request timestamp.
    #[must_use]
    pub fn request_time(&self) -> Option<&'a str> {
        self.field(REQUEST_TIME)
    }

    /// Status code.
    #[must_use]
    pub fn status_code(&self) -> Option<&'a str> {
        self.field(STATUS_CODE)
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> Option<&'a str> {
        self.field(REQUEST_URL)
    }

    /// Sum of the three latency components in seconds.
    ///
    /// A missing or non-numeric component counts as zero.
    #[must_use]
    pub fn time_taken(&self) -> f64 {
        LATENCY_FIELDS.iter().map(|&i| self.seconds(i)).sum()
    }

    fn seconds(&self, index: usize) -> f64 {
        self.field(index)
            .and_then(|f| f.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}
