//! # slice-alerts
//!
//! Alert records and their resolution into a remote log location and an
//! incident time window.
//!
//! This crate provides:
//!
//! - [`AlertRecord`] and [`AlertCategory`]: alerts as produced by the alert source
//! - [`ClientDirectory`]: client ids, aliases and log prefixes, in document order
//! - [`TimeWindow`]: a closed ±15 minute interval around the alert instant
//! - [`WindowResolver`]: alert + directory → [`ResolvedAlert`]
//! - [`load_alerts`]: reads the alert source's JSON output
//!
//! ## Example
//!
//! ```rust
//! use slice_alerts::{AlertCategory, AlertRecord, ClientDirectory, ClientMapEntry, WindowResolver};
//!
//! let directory = ClientDirectory::new()
//!     .with_client("ACME", ClientMapEntry::new("s3://logs/acme-elb", "s3://logs/acme-alb"));
//!
//! let alert = AlertRecord::new(AlertCategory::ClientErrors, "ALERT - ACME - 4xx errors", "2024-01-10")
//!     .with_utc_time("12:00:00");
//!
//! let resolved = WindowResolver::new(&directory).resolve(&alert).expect("resolve");
//! assert_eq!(resolved.client_key, "ACME");
//! assert_eq!(resolved.remote_path, "s3://logs/acme-elb/2024/01/10/");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod directory;
pub mod error;
pub mod resolver;
pub mod source;
pub mod types;
pub mod window;

pub use directory::{subject_tokens, ClientDirectory, ClientMapEntry};
pub use error::{AlertError, Result};
pub use resolver::{LogFamily, PathRule, ResolvedAlert, WindowResolver};
pub use source::{load_alerts, parse_alerts};
pub use types::{AlertCategory, AlertRecord};
pub use window::{parse_alert_instant, TimeWindow, DEFAULT_WINDOW_MINUTES};
