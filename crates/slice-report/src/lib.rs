//! # slice-report
//!
//! Output side of an incident run: the report files that sit next to each
//! incident folder, and the manifest describing the archive built from them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod error;
pub mod naming;
pub mod writer;

pub use archive::{ArchiveEntry, ArchiveManifest, Archiver, ManifestArchiver};
pub use error::{ReportError, Result};
pub use naming::{report_path, ReportFile};
pub use writer::ReportWriter;
