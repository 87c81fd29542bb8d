//! Remote log stores.
//!
//! The pipeline only needs two operations from a store: list the file names
//! under a prefix and download one of them into a local folder.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{FetchError, Result};

/// A source of remote log files.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Lists the file names directly under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Downloads `prefix` + `name` into `dest`, returning the local path.
    async fn fetch(&self, prefix: &str, name: &str, dest: &Path) -> Result<PathBuf>;
}

/// Rejects names that would escape the destination folder.
fn checked_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(FetchError::InvalidPath(name.to_string())),
    }
}

/// A local directory laid out like the remote bucket.
///
/// `s3://bucket/a/b/` maps to `<root>/bucket/a/b/`. Useful offline and in
/// tests.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    /// Creates a mirror rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The mirror root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a remote prefix to a directory under the root.
    pub fn local_dir(&self, prefix: &str) -> Result<PathBuf> {
        let relative = prefix
            .split_once("://")
            .map_or(prefix, |(_, rest)| rest)
            .trim_start_matches('/');
        let mut dir = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => dir.push(part),
                Component::CurDir => {}
                _ => return Err(FetchError::InvalidPath(prefix.to_string())),
            }
        }
        Ok(dir)
    }
}

impl RemoteStore for LocalMirror {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.local_dir(prefix)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "prefix not present in mirror");
                return Ok(Vec::new());
            }
            Err(e) => return Err(FetchError::list(format!("{}: {e}", dir.display()))),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FetchError::list(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| FetchError::list(e.to_string()))?
                .is_file();
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn fetch(&self, prefix: &str, name: &str, dest: &Path) -> Result<PathBuf> {
        let name = checked_name(name)?;
        let source = self.local_dir(prefix)?.join(name);
        let target = dest.join(name);
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| FetchError::fetch(format!("{}: {e}", source.display())))?;
        Ok(target)
    }
}

/// Store backed by the `aws s3` command-line tool.
#[derive(Debug, Clone)]
pub struct AwsCliStore {
    program: PathBuf,
    profile: Option<String>,
}

impl Default for AwsCliStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsCliStore {
    /// Uses `aws` from `PATH` with the default profile.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("aws"),
            profile: None,
        }
    }

    /// Sets the named profile passed as `--profile`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Overrides the executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }

    /// Parses `aws s3 ls` output into file names, skipping `PRE` folders.
    ///
    /// Each object line is `<date> <time> <size> <key>`; the key is
    /// everything after the size column, spaces included.
    #[must_use]
    pub fn parse_listing(output: &str) -> Vec<String> {
        output
            .lines()
            .filter(|line| !line.trim_start().starts_with("PRE "))
            .filter_map(listing_key)
            .map(str::to_string)
            .collect()
    }
}

fn listing_key(line: &str) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..3 {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }
    let key = rest.trim_end_matches('\r');
    (!key.is_empty()).then_some(key)
}

impl RemoteStore for AwsCliStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        debug!(prefix, "listing remote prefix");
        let output = self
            .command()
            .args(["s3", "ls", prefix])
            .output()
            .await
            .map_err(|e| FetchError::list(format!("{}: {e}", self.program.display())))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            // `aws s3 ls` exits 1 without output when nothing matches
            if stderr.trim().is_empty() && output.stdout.is_empty() {
                return Ok(Vec::new());
            }
            return Err(FetchError::list(stderr.trim().to_string()));
        }

        Ok(Self::parse_listing(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn fetch(&self, prefix: &str, name: &str, dest: &Path) -> Result<PathBuf> {
        let name = checked_name(name)?;
        let source = format!("{prefix}{name}");
        let target = dest.join(name);
        debug!(source = %source, target = %target.display(), "downloading");

        let output = self
            .command()
            .args(["s3", "cp", "--only-show-errors", source.as_str()])
            .arg(&target)
            .output()
            .await
            .map_err(|e| FetchError::fetch(format!("{}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::fetch(format!("{source}: {}", stderr.trim())));
        }
        Ok(target)
    }
}
