//! Archive manifests.
//!
//! Packing the reports is left to an [`Archiver`]. The bundled
//! [`ManifestArchiver`] records what would go into the archive as JSON so an
//! external packer (or a person) can pick it up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReportError, Result};

/// One file to place in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// File on disk.
    pub source_path: PathBuf,
    /// Name inside the archive.
    pub entry_name: String,
}

/// The contents of one incident archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Archive file name, `<folder_name>.zip`.
    pub archive_name: String,
    /// Files to include.
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveManifest {
    /// Builds the manifest for `folder_name` from the report files that exist.
    #[must_use]
    pub fn for_reports(folder_name: &str, reports: &[PathBuf]) -> Self {
        let entries = reports
            .iter()
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let entry_name = path.file_name()?.to_string_lossy().into_owned();
                Some(ArchiveEntry {
                    source_path: path.clone(),
                    entry_name,
                })
            })
            .collect();
        Self {
            archive_name: format!("{folder_name}.zip"),
            entries,
        }
    }

    /// Returns true if there is nothing to archive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Consumes an [`ArchiveManifest`].
pub trait Archiver {
    /// Archives the manifest's entries, returning the path produced.
    fn archive(&self, manifest: &ArchiveManifest) -> Result<PathBuf>;
}

/// Writes `<archive_name>.manifest.json` into a directory.
#[derive(Debug, Clone)]
pub struct ManifestArchiver {
    dir: PathBuf,
}

impl ManifestArchiver {
    /// Creates an archiver writing manifests into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Archiver for ManifestArchiver {
    fn archive(&self, manifest: &ArchiveManifest) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| ReportError::io(&self.dir, e))?;
        let path = self
            .dir
            .join(format!("{}.manifest.json", manifest.archive_name));
        let body = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, body).map_err(|e| ReportError::io(&path, e))?;
        info!(
            archive = %manifest.archive_name,
            entries = manifest.entries.len(),
            path = %path.display(),
            "wrote archive manifest"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_existing_reports() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let present = tmp.path().join("ACME-5xx-20240110-120000-5xx-urls.txt");
        let missing = tmp.path().join("ACME-5xx-20240110-120000-5xx-rawlog.txt");
        fs::write(&present, "x\n").expect("write");

        let manifest =
            ArchiveManifest::for_reports("ACME-5xx-20240110-120000", &[missing, present.clone()]);
        assert_eq!(manifest.archive_name, "ACME-5xx-20240110-120000.zip");
        assert_eq!(
            manifest.entries,
            vec![ArchiveEntry {
                source_path: present,
                entry_name: "ACME-5xx-20240110-120000-5xx-urls.txt".to_string(),
            }]
        );
    }

    #[test]
    fn manifest_archiver_writes_json() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let manifest = ArchiveManifest {
            archive_name: "folder.zip".to_string(),
            entries: vec![ArchiveEntry {
                source_path: tmp.path().join("folder-urls.txt"),
                entry_name: "folder-urls.txt".to_string(),
            }],
        };

        let archiver = ManifestArchiver::new(tmp.path().join("out"));
        let path = archiver.archive(&manifest).expect("archive");
        assert_eq!(path, tmp.path().join("out/folder.zip.manifest.json"));

        let parsed: ArchiveManifest =
            serde_json::from_str(&fs::read_to_string(&path).expect("read manifest")).expect("manifest json");
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn empty_manifest() {
        let manifest = ArchiveManifest::for_reports("none", &[]);
        assert!(manifest.is_empty());
        assert_eq!(manifest.archive_name, "none.zip");
    }
}
