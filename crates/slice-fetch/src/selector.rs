//! Two-stage selection of log files inside an incident window.
//!
//! The coarse stage runs on the remote listing before anything is
//! downloaded. It matches names against 5-minute markers and may let
//! neighbouring files through. The exact stage runs on the downloaded files,
//! reads the timestamp embedded in each name and deletes every file outside
//! the window.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use slice_alerts::TimeWindow;
use tracing::{debug, info};

use crate::error::Result;

/// Spacing of the coarse markers, in seconds.
pub const MARKER_STEP_SECS: i64 = 5 * 60;

/// Layout of the timestamp embedded in log file names.
const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M";

static NAME_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d{8}T\d{4})Z_").unwrap_or_else(|_| unreachable!()));

/// A remote file name and the instant embedded in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRef {
    /// File name.
    pub name: String,
    /// Instant parsed from `_<YYYYMMDD>T<HHMM>Z_`, if the name has one.
    pub embedded_timestamp: Option<DateTime<Utc>>,
}

impl RemoteFileRef {
    /// Builds a reference, extracting the embedded timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let embedded_timestamp = embedded_timestamp(&name);
        Self {
            name,
            embedded_timestamp,
        }
    }
}

/// Extracts the instant embedded in a log file name.
#[must_use]
pub fn embedded_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let captures = NAME_TIMESTAMP.captures(name)?;
    let stamp = captures.get(1)?.as_str();
    NaiveDateTime::parse_from_str(stamp, NAME_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Selects files for one incident window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSelector {
    window: TimeWindow,
}

impl FileSelector {
    /// Creates a selector for `window`.
    #[must_use]
    pub const fn new(window: TimeWindow) -> Self {
        Self { window }
    }

    /// The window being selected for.
    #[must_use]
    pub const fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Every 5-minute-aligned instant in `[lower, upper]`, as `YYYYMMDDTHHMM`.
    #[must_use]
    pub fn coarse_markers(&self) -> Vec<String> {
        let lower = self.window.lower.timestamp();
        let upper = self.window.upper.timestamp();
        let mut tick = lower.div_euclid(MARKER_STEP_SECS) * MARKER_STEP_SECS;
        if tick < lower {
            tick += MARKER_STEP_SECS;
        }

        let mut markers = Vec::new();
        while tick <= upper {
            if let Some(instant) = DateTime::from_timestamp(tick, 0) {
                markers.push(instant.format(NAME_TIMESTAMP_FORMAT).to_string());
            }
            tick += MARKER_STEP_SECS;
        }
        markers
    }

    /// Keeps remote names that contain `_` followed by a coarse marker.
    #[must_use]
    pub fn coarse_filter<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let needles: Vec<String> = self
            .coarse_markers()
            .into_iter()
            .map(|m| format!("_{m}"))
            .collect();
        let kept: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| needles.iter().any(|n| name.contains(n.as_str())))
            .map(str::to_string)
            .collect();
        debug!(listed = names.len(), kept = kept.len(), "coarse filter");
        kept
    }

    /// Returns true if the file's embedded instant is inside the window.
    #[must_use]
    pub fn accepts(&self, file: &RemoteFileRef) -> bool {
        file.embedded_timestamp
            .is_some_and(|instant| self.window.contains(instant))
    }

    /// Deletes every file in `dir` that is not in the window and returns the
    /// remaining files sorted by name.
    pub fn prune_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut kept = Vec::new();
        let mut removed = 0usize;

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.accepts(&RemoteFileRef::new(name)) {
                kept.push(entry.path());
            } else {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        kept.sort();
        info!(
            dir = %dir.display(),
            kept = kept.len(),
            removed,
            "pruned files outside window"
        );
        Ok(kept)
    }
}
