//! # slice-fetch
//!
//! Retrieval of the log files that fall inside an incident window.
//!
//! - [`FileSelector`]: coarse 5-minute name markers before download, exact
//!   embedded-timestamp pruning after
//! - [`RemoteStore`]: list/fetch interface, with [`LocalMirror`] and
//!   [`AwsCliStore`] adapters
//! - [`fetch_window`]: the whole retrieval for one [`slice_alerts::ResolvedAlert`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fetch;
pub mod selector;
pub mod store;

pub use error::{FetchError, Result};
pub use fetch::{fetch_window, FetchOutcome};
pub use selector::{embedded_timestamp, FileSelector, RemoteFileRef, MARKER_STEP_SECS};
pub use store::{AwsCliStore, LocalMirror, RemoteStore};
