//! # slice-logs
//!
//! Classification and aggregation of load balancer access logs.
//!
//! This crate provides:
//!
//! - [`LogLine`]: the positional shape of a log line
//! - [`LineClassifier`]: pure per-line classification (4xx, 5xx, high latency)
//! - [`StreamAggregator`]: one pass per file, per-file [`IncidentReport`]s and
//!   cumulative [`RunStats`]
//! - [`open_log`]: plain or gzip-compressed file readers
//!
//! ## Example
//!
//! ```rust
//! use slice_logs::{Classification, LineClassifier};
//!
//! let line = "https 2024-01-10T12:00:00Z app/lb/1 1.1.1.1:1 2.2.2.2:80 0.1 2.4 0.0 502 502 1 2 \"GET /api HTTP/1.1\"";
//! let Classification::Parsed(parsed) = LineClassifier::new().classify(line) else {
//!     unreachable!()
//! };
//! assert!(parsed.is_error_5xx);
//! assert!(parsed.is_high_latency);
//! assert_eq!(parsed.url, Some("/api"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod reader;
pub mod shape;
pub mod types;

pub use aggregator::StreamAggregator;
pub use classifier::{
    Classification, LineClassifier, ParsedLine, ABSENT_FIELD, DEFAULT_LATENCY_THRESHOLD_SECS,
};
pub use error::{LogError, Result};
pub use reader::{is_gzip, open_log, Lines};
pub use shape::LogLine;
pub use types::{
    high_latency_order, AggregationMode, ClassifiedEntry, EntryKind, IncidentReport, RunStats,
};
