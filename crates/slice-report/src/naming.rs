//! Report file names.
//!
//! Reports sit next to the incident folder: for a folder `out/ACME-4xx-20240110-120000`
//! the raw log report is `out/ACME-4xx-20240110-120000-rawlog.txt`.

use std::fmt;
use std::path::{Path, PathBuf};

use slice_logs::AggregationMode;

/// One of the report files an incident run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFile {
    /// 4xx lines, verbatim.
    RawLog,
    /// 4xx URLs.
    Urls,
    /// 5xx lines, verbatim.
    ServerRawLog,
    /// 5xx summary lines.
    ServerUrls,
    /// High-latency summary lines, slowest first.
    HighResponseUrls,
}

impl ReportFile {
    /// Suffix appended to the folder path.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::RawLog => "-rawlog.txt",
            Self::Urls => "-urls.txt",
            Self::ServerRawLog => "-5xx-rawlog.txt",
            Self::ServerUrls => "-5xx-urls.txt",
            Self::HighResponseUrls => "-highresponse-urls.txt",
        }
    }

    /// Files produced in `mode`, in write order.
    #[must_use]
    pub const fn for_mode(mode: AggregationMode) -> &'static [Self] {
        match mode {
            AggregationMode::ClientErrors => &[Self::RawLog, Self::Urls],
            AggregationMode::ServerErrorsAndLatency => {
                &[Self::ServerRawLog, Self::ServerUrls, Self::HighResponseUrls]
            }
        }
    }
}

impl fmt::Display for ReportFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix().trim_start_matches('-'))
    }
}

/// Path of `file` for the incident folder `dir`.
///
/// A trailing separator on `dir` is ignored.
#[must_use]
pub fn report_path(dir: &Path, file: ReportFile) -> PathBuf {
    let base = dir.to_string_lossy();
    let base = base.trim_end_matches(['/', '\\']);
    PathBuf::from(format!("{base}{}", file.suffix()))
}
