//! Client directory: canonical client ids, their aliases and log locations.
//!
//! The directory keeps the insertion order of its source document. Subject
//! matching walks entries in that order and the first hit wins.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{AlertError, Result};

/// Storage locations and aliases for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMapEntry {
    /// Alternative names that identify the client in alert subjects.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// URI prefix of the classic load balancer logs.
    #[serde(default, alias = "elbPath")]
    pub elb: String,
    /// URI prefix of the application load balancer logs.
    #[serde(default, alias = "albPath")]
    pub alb: String,
}

impl ClientMapEntry {
    /// Creates an entry with both storage paths.
    #[must_use]
    pub fn new(elb: impl Into<String>, alb: impl Into<String>) -> Self {
        Self {
            aliases: Vec::new(),
            elb: elb.into(),
            alb: alb.into(),
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Ordered mapping of client id to [`ClientMapEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDirectory {
    entries: Vec<(String, ClientMapEntry)>,
}

impl ClientDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entry: ClientMapEntry) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = entry;
        } else {
            self.entries.push((key, entry));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_client(mut self, key: impl Into<String>, entry: ClientMapEntry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Looks up a client by canonical id.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ClientMapEntry> {
        self.entries
            .iter()
            .find_map(|(k, entry)| (k == key).then_some(entry))
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClientMapEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no clients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a directory from a JSON object keyed by client id.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a directory from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AlertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&content)?;
        debug!(count = directory.len(), path = %path.display(), "loaded client directory");
        Ok(directory)
    }

    /// Finds the first client whose key or alias is a token of `subject`.
    ///
    /// Tokens are the pieces between runs of `-` and `"`, compared
    /// case-sensitively. A token matches when it equals a key or alias
    /// verbatim, or when its whitespace-trimmed form does.
    #[must_use]
    pub fn match_subject(&self, subject: &str) -> Option<&str> {
        let tokens = subject_tokens(subject);
        let matches = |name: &str| {
            tokens
                .iter()
                .any(|token| *token == name || token.trim() == name)
        };
        self.entries.iter().find_map(|(key, entry)| {
            let hit = matches(key.as_str())
                || entry.aliases.iter().any(|alias| matches(alias.as_str()));
            hit.then_some(key.as_str())
        })
    }
}

/// Splits a subject line into client-matching tokens.
///
/// Tokens keep their surrounding whitespace; only the empty pieces between
/// adjacent separators are dropped.
#[must_use]
pub fn subject_tokens(subject: &str) -> Vec<&str> {
    subject
        .split(['-', '"'])
        .filter(|t| !t.is_empty())
        .collect()
}

impl Serialize for ClientDirectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

struct DirectoryVisitor;

impl<'de> Visitor<'de> for DirectoryVisitor {
    type Value = ClientDirectory;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by client id")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut directory = ClientDirectory::new();
        while let Some((key, entry)) = access.next_entry::<String, ClientMapEntry>()? {
            directory.insert(key, entry);
        }
        Ok(directory)
    }
}

impl<'de> Deserialize<'de> for ClientDirectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DirectoryVisitor)
    }
}
