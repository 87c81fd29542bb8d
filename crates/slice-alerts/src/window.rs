//! Time windows around an alert instant.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};

/// Default half-width of an incident window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// A closed interval `[lower, upper]` centred on an alert instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// The alert instant.
    pub center: DateTime<Utc>,
    /// `center - radius`, inclusive.
    pub lower: DateTime<Utc>,
    /// `center + radius`, inclusive.
    pub upper: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of ±15 minutes around `center`.
    #[must_use]
    pub fn around(center: DateTime<Utc>) -> Self {
        Self::with_radius(center, Duration::minutes(DEFAULT_WINDOW_MINUTES))
    }

    /// Window of ±`radius` around `center`. A negative radius is treated as zero.
    #[must_use]
    pub fn with_radius(center: DateTime<Utc>, radius: Duration) -> Self {
        let radius = radius.max(Duration::zero());
        Self {
            center,
            lower: center - radius,
            upper: center + radius,
        }
    }

    /// Returns true if `instant` lies in the window, both ends included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.lower <= instant && instant <= self.upper
    }

    /// Total length of the window.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.upper - self.lower
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.lower.format("%Y-%m-%dT%H:%M:%SZ"),
            self.upper.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

/// Parses an alert's date and optional UTC time of day into an instant.
///
/// `date` is either `YYYY-MM-DD` or a full RFC 3339 timestamp. A calendar
/// date without a time of day means midnight UTC. When `date` already carries
/// a time, `time_of_day` is ignored.
pub fn parse_alert_instant(date: &str, time_of_day: Option<&str>) -> Result<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(date) {
        return Ok(instant.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AlertError::InvalidDate(date.to_string()))?;

    let time = match time_of_day.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .map_err(|_| AlertError::InvalidDate(format!("{date} {t}")))?,
        None => NaiveTime::MIN,
    };

    Ok(day.and_time(time).and_utc())
}
