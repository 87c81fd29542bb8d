//! Core alert types.
//!
//! - [`AlertCategory`]: which kind of incident an alert reports
//! - [`AlertRecord`]: one alert as produced by the alert source

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The category of an alert, taken from its `scripts_to_run` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    /// Client errors (HTTP 4xx).
    ClientErrors,
    /// Server errors (HTTP 5xx).
    ServerErrors,
    /// Abnormal target response time.
    TargetResponseTime,
    /// Any category this tool does not know about.
    Other(String),
}

impl AlertCategory {
    /// Parses a category name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "4xx" => Self::ClientErrors,
            "5xx" => Self::ServerErrors,
            "targetresponsetime" => Self::TargetResponseTime,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Returns the category as it appears in alert documents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClientErrors => "4xx",
            Self::ServerErrors => "5xx",
            Self::TargetResponseTime => "targetresponsetime",
            Self::Other(name) => name,
        }
    }

    /// Returns true for the 4xx category.
    #[must_use]
    pub const fn is_client_errors(&self) -> bool {
        matches!(self, Self::ClientErrors)
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AlertCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlertCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// One alert, immutable once loaded. Drives exactly one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Human-facing alarm type (`4xx`, `5xx`, `TargetResponseTime`).
    #[serde(default)]
    pub alarm_type: String,
    /// Category that selects the log family and the aggregation mode.
    #[serde(alias = "script_to_run")]
    pub scripts_to_run: AlertCategory,
    /// Subject line, used to identify the client.
    #[serde(default)]
    pub subject: String,
    /// Sender of the alert.
    #[serde(default)]
    pub from: String,
    /// Calendar date (`YYYY-MM-DD`) or a full RFC 3339 timestamp.
    ///
    /// A record without one still loads; resolving it fails with
    /// `InvalidDate`.
    #[serde(default)]
    pub date: String,
    /// Time of day in UTC (`HH:MM:SS`); empty when the alert carried none.
    #[serde(default)]
    pub utc_time: Option<String>,
    /// Set for follow-up messages that should not trigger a run.
    #[serde(default)]
    pub ignore: bool,
}

impl AlertRecord {
    /// Creates a record with the given category, subject and date.
    #[must_use]
    pub fn new(
        category: AlertCategory,
        subject: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            alarm_type: category.as_str().to_string(),
            scripts_to_run: category,
            subject: subject.into(),
            from: String::new(),
            date: date.into(),
            utc_time: None,
            ignore: false,
        }
    }

    /// Sets the UTC time of day.
    #[must_use]
    pub fn with_utc_time(mut self, time: impl Into<String>) -> Self {
        self.utc_time = Some(time.into());
        self
    }

    /// Sets the alarm type label.
    #[must_use]
    pub fn with_alarm_type(mut self, alarm_type: impl Into<String>) -> Self {
        self.alarm_type = alarm_type.into();
        self
    }

    /// Returns the time of day, treating an empty string as absent.
    #[must_use]
    pub fn time_of_day(&self) -> Option<&str> {
        self.utc_time
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Returns the alarm type, falling back to the category name.
    #[must_use]
    pub fn alarm_label(&self) -> &str {
        let label = self.alarm_type.trim();
        if label.is_empty() {
            self.scripts_to_run.as_str()
        } else {
            label
        }
    }
}
