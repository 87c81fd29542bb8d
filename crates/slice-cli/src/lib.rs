//! # slice-cli
//!
//! The `logslice` command line.
//!
//! Provides commands for:
//! - Running a batch of alerts end to end
//! - Resolving alerts without touching the store
//! - Scanning a folder that is already on disk
//!
//! # Architecture
//!
//! ```text
//! alerts ──► WindowResolver ──► FileSelector/RemoteStore ──► StreamAggregator ──► ReportWriter ──► Archiver
//!            (slice-alerts)     (slice-fetch)                (slice-logs)         (slice-report)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod pipeline;

pub use cli::{Cli, Commands, Format, ModeArg, PathRuleArg, ResolveArgs, RunArgs, ScanArgs};
pub use error::CliError;
pub use output::OutputFormat;
pub use pipeline::{AlertOutcome, IncidentPipeline, PipelineOptions, ProcessedAlert, RunSummary};
