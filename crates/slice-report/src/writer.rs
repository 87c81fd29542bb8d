//! Report writing.
//!
//! A [`ReportWriter`] owns the report files of one incident folder for the
//! length of a run. [`ReportWriter::begin`] clears what a previous run left
//! behind, [`ReportWriter::write`] appends one file's findings, and
//! [`ReportWriter::finish`] returns the reports that now exist.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use slice_logs::{AggregationMode, IncidentReport};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::naming::{report_path, ReportFile};

/// Appends per-file incident reports to the report files of one folder.
#[derive(Debug)]
pub struct ReportWriter {
    dir: PathBuf,
    mode: AggregationMode,
    written: Vec<ReportFile>,
}

impl ReportWriter {
    /// Starts a run for `dir`, removing any report files of `mode` left by an
    /// earlier run.
    pub fn begin(dir: impl Into<PathBuf>, mode: AggregationMode) -> Result<Self> {
        let dir = dir.into();
        for file in ReportFile::for_mode(mode) {
            let path = report_path(&dir, *file);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed stale report"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(ReportError::io(path, e)),
            }
        }
        Ok(Self {
            dir,
            mode,
            written: Vec::new(),
        })
    }

    /// The incident folder the reports belong to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The mode the run was started in.
    #[must_use]
    pub const fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Appends the non-empty buckets of `report`.
    pub fn write(&mut self, report: &IncidentReport) -> Result<()> {
        match self.mode {
            AggregationMode::ClientErrors => {
                self.append(ReportFile::RawLog, &report.raw_error_lines)?;
                self.append(ReportFile::Urls, &report.error_urls)?;
            }
            AggregationMode::ServerErrorsAndLatency => {
                self.append(ReportFile::ServerRawLog, &report.raw_error_lines)?;
                self.append(ReportFile::ServerUrls, &report.error_urls)?;
                self.append(ReportFile::HighResponseUrls, &report.high_latency_lines())?;
            }
        }
        Ok(())
    }

    /// Ends the run, returning the report files written, in canonical order.
    #[must_use]
    pub fn finish(self) -> Vec<PathBuf> {
        ReportFile::for_mode(self.mode)
            .iter()
            .filter(|file| self.written.contains(*file))
            .map(|file| report_path(&self.dir, *file))
            .collect()
    }

    fn append(&mut self, file: ReportFile, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let path = report_path(&self.dir, file);
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ReportError::io(&path, e))?;
        let mut out = BufWriter::new(handle);
        for line in lines {
            writeln!(out, "{line}").map_err(|e| ReportError::io(&path, e))?;
        }
        out.flush().map_err(|e| ReportError::io(&path, e))?;

        if !self.written.contains(&file) {
            self.written.push(file);
        }
        debug!(path = %path.display(), lines = lines.len(), "appended report lines");
        Ok(())
    }
}
