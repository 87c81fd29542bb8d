//! Fetching the files of one resolved alert.

use std::path::{Path, PathBuf};

use slice_alerts::ResolvedAlert;
use tracing::info;

use crate::error::Result;
use crate::selector::FileSelector;
use crate::store::RemoteStore;

/// What a fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Destination folder holding the in-window files.
    pub folder: PathBuf,
    /// Names returned by the remote listing.
    pub listed: usize,
    /// Names that passed the coarse filter and were downloaded.
    pub downloaded: usize,
    /// In-window files, sorted by name.
    pub files: Vec<PathBuf>,
}

/// Lists, coarse-filters, downloads and exact-prunes the files for `resolved`
/// into `dest_root/<folder_name>`.
///
/// A transport failure aborts the fetch; the destination folder is left as is.
pub async fn fetch_window<S: RemoteStore>(
    store: &S,
    resolved: &ResolvedAlert,
    dest_root: &Path,
) -> Result<FetchOutcome> {
    let folder = dest_root.join(&resolved.folder_name);
    tokio::fs::create_dir_all(&folder).await?;

    let selector = FileSelector::new(resolved.window);
    let names = store.list(&resolved.remote_path).await?;
    let candidates = selector.coarse_filter(&names);
    info!(
        prefix = %resolved.remote_path,
        listed = names.len(),
        candidates = candidates.len(),
        "listed remote files"
    );

    for name in &candidates {
        store.fetch(&resolved.remote_path, name, &folder).await?;
    }

    let files = selector.prune_directory(&folder)?;
    Ok(FetchOutcome {
        folder,
        listed: names.len(),
        downloaded: candidates.len(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::store::LocalMirror;
    use slice_alerts::{AlertCategory, AlertRecord, ClientDirectory, ClientMapEntry, WindowResolver};
    use std::cell::RefCell;

    fn resolved() -> ResolvedAlert {
        let directory = ClientDirectory::new().with_client(
            "ACME",
            ClientMapEntry::new("s3://bucket/acme-elb", "s3://bucket/acme-alb"),
        );
        let alert = AlertRecord::new(AlertCategory::ServerErrors, "ALERT - ACME - 5xx", "2024-01-10")
            .with_utc_time("12:00:00");
        WindowResolver::new(&directory).resolve(&alert).expect("resolve")
    }

    fn name(stamp: &str) -> String {
        format!("acct_elasticloadbalancing_eu-west-1_acme_{stamp}Z_10.0.0.1_r.log")
    }

    #[tokio::test]
    async fn fetches_only_window_files() {
        let mirror_root = tempfile::tempdir().expect("tempdir");
        let day = mirror_root.path().join("bucket/acme-elb/2024/01/10");
        std::fs::create_dir_all(&day).expect("mkdir");
        for stamp in ["20240110T1140", "20240110T1145", "20240110T1200", "20240110T1215", "20240110T1230"] {
            std::fs::write(day.join(name(stamp)), stamp).expect("write");
        }

        let out = tempfile::tempdir().expect("tempdir");
        let outcome = fetch_window(&LocalMirror::new(mirror_root.path()), &resolved(), out.path())
            .await
            .expect("fetch");

        assert_eq!(outcome.folder, out.path().join("ACME-5xx-20240110-120000"));
        assert_eq!(outcome.listed, 5);
        assert_eq!(outcome.downloaded, 3);
        assert_eq!(
            outcome.files,
            vec![
                outcome.folder.join(name("20240110T1145")),
                outcome.folder.join(name("20240110T1200")),
                outcome.folder.join(name("20240110T1215")),
            ]
        );
    }

    struct FailingStore {
        calls: RefCell<Vec<&'static str>>,
    }

    impl RemoteStore for FailingStore {
        async fn list(&self, _prefix: &str) -> crate::error::Result<Vec<String>> {
            self.calls.borrow_mut().push("list");
            Err(FetchError::list("connection reset"))
        }

        async fn fetch(&self, _prefix: &str, _name: &str, _dest: &Path) -> crate::error::Result<PathBuf> {
            self.calls.borrow_mut().push("fetch");
            Err(FetchError::fetch("unreachable"))
        }
    }

    #[tokio::test]
    async fn transport_failure_leaves_folder() {
        let out = tempfile::tempdir().expect("tempdir");
        let store = FailingStore {
            calls: RefCell::new(Vec::new()),
        };
        let err = fetch_window(&store, &resolved(), out.path()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(*store.calls.borrow(), vec!["list"]);
        assert!(out.path().join("ACME-5xx-20240110-120000").is_dir());
    }
}
