//! Resolution of an alert into a remote log location and a time window.

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::ClientDirectory;
use crate::error::{AlertError, Result};
use crate::types::{AlertCategory, AlertRecord};
use crate::window::{parse_alert_instant, TimeWindow, DEFAULT_WINDOW_MINUTES};

/// The two families of load balancer logs a client can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFamily {
    /// Classic load balancer logs.
    Elb,
    /// Application load balancer logs.
    Alb,
}

impl LogFamily {
    /// Returns the family name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Elb => "elb",
            Self::Alb => "alb",
        }
    }
}

impl std::fmt::Display for LogFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rule that maps an alert category to a log family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathRule {
    /// 4xx, 5xx and target response time read `elb`; anything else reads `alb`.
    #[default]
    Canonical,
    /// Only 4xx reads `elb`; everything else reads `alb`.
    Legacy,
}

impl PathRule {
    /// Selects the log family for a category.
    #[must_use]
    pub fn family_for(&self, category: &AlertCategory) -> LogFamily {
        match (self, category) {
            (_, AlertCategory::ClientErrors) => LogFamily::Elb,
            (
                Self::Canonical,
                AlertCategory::ServerErrors | AlertCategory::TargetResponseTime,
            ) => LogFamily::Elb,
            _ => LogFamily::Alb,
        }
    }
}

/// Everything the fetch and aggregation stages need to know about one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAlert {
    /// Canonical client id matched from the subject.
    pub client_key: String,
    /// Alert category.
    pub category: AlertCategory,
    /// Alarm type label used in the folder name.
    pub alarm_type: String,
    /// Log family the path was taken from.
    pub family: LogFamily,
    /// Remote prefix for the alert's UTC day, ending in `/`.
    pub remote_path: String,
    /// Incident window.
    pub window: TimeWindow,
    /// Destination folder name, unique per client, alarm type and instant.
    pub folder_name: String,
}

/// Resolves alerts against a client directory.
#[derive(Debug, Clone)]
pub struct WindowResolver<'a> {
    directory: &'a ClientDirectory,
    rule: PathRule,
    radius: Duration,
}

impl<'a> WindowResolver<'a> {
    /// Creates a resolver with the canonical path rule and a ±15 minute window.
    #[must_use]
    pub fn new(directory: &'a ClientDirectory) -> Self {
        Self {
            directory,
            rule: PathRule::default(),
            radius: Duration::minutes(DEFAULT_WINDOW_MINUTES),
        }
    }

    /// Sets the path rule.
    #[must_use]
    pub const fn with_path_rule(mut self, rule: PathRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the half-width of the window.
    #[must_use]
    pub const fn with_radius(mut self, radius: Duration) -> Self {
        self.radius = radius;
        self
    }

    /// Resolves one alert.
    pub fn resolve(&self, alert: &AlertRecord) -> Result<ResolvedAlert> {
        let center = parse_alert_instant(&alert.date, alert.time_of_day())?;

        let client_key = self
            .directory
            .match_subject(&alert.subject)
            .ok_or_else(|| AlertError::ClientNotMatched {
                subject: alert.subject.clone(),
            })?;
        // match_subject only returns keys present in the directory
        let entry = self
            .directory
            .get(client_key)
            .ok_or_else(|| AlertError::ClientNotMatched {
                subject: alert.subject.clone(),
            })?;

        let category = alert.scripts_to_run.clone();
        let family = self.rule.family_for(&category);
        let base = match family {
            LogFamily::Elb => entry.elb.as_str(),
            LogFamily::Alb => entry.alb.as_str(),
        };
        if base.trim().is_empty() {
            return Err(AlertError::PathNotConfigured {
                client: client_key.to_string(),
                category: category.as_str().to_uppercase(),
            });
        }

        let remote_path = format!(
            "{}/{:04}/{:02}/{:02}/",
            base.trim().trim_end_matches('/'),
            center.year(),
            center.month(),
            center.day()
        );
        let alarm_type = alert.alarm_label().to_string();
        let folder_name = format!(
            "{}-{}-{}",
            path_segment(client_key),
            path_segment(&alarm_type),
            center.format("%Y%m%d-%H%M%S")
        );
        let window = TimeWindow::with_radius(center, self.radius);

        debug!(
            client = client_key,
            %family,
            path = %remote_path,
            %window,
            "resolved alert"
        );

        Ok(ResolvedAlert {
            client_key: client_key.to_string(),
            category,
            alarm_type,
            family,
            remote_path,
            window,
            folder_name,
        })
    }
}

/// Makes `label` safe to use inside a single path component.
fn path_segment(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
