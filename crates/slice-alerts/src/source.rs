//! Loading alert records from the alert source's JSON output.
//!
//! The mailbox poller writes an array of records; a hand-written alert file
//! usually holds a single object. Both shapes are accepted.
//!
//! Array elements are decoded one at a time: an element that does not fit
//! the record schema is logged and dropped, and the remaining alerts load.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AlertError, Result};
use crate::types::AlertRecord;

/// Parses alert records from JSON text.
///
/// Fails only when the text is not JSON, or when a single-object document
/// is not a valid record.
pub fn parse_alerts(json: &str) -> Result<Vec<AlertRecord>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(elements) => Ok(elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| decode_element(index, element))
            .collect()),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

fn decode_element(index: usize, element: Value) -> Option<AlertRecord> {
    match serde_json::from_value::<AlertRecord>(element) {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(index, %error, "skipping malformed alert record");
            None
        }
    }
}

/// Loads alert records from a JSON file.
pub fn load_alerts(path: &Path) -> Result<Vec<AlertRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| AlertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let alerts = parse_alerts(&content)?;
    info!(count = alerts.len(), path = %path.display(), "loaded alerts");
    Ok(alerts)
}
