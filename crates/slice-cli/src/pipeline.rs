//! The incident pipeline: alert → window → files → reports → manifest.
//!
//! Alerts are handled one after another and files within an alert one after
//! another. A failure that belongs to one alert (no matching client, no log
//! path, store unreachable, report not writable) is logged and recorded as a
//! skipped alert; the batch carries on.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use slice_alerts::{
    AlertRecord, ClientDirectory, LogFamily, PathRule, ResolvedAlert, WindowResolver,
    DEFAULT_WINDOW_MINUTES,
};
use slice_fetch::{fetch_window, RemoteStore};
use slice_logs::{
    AggregationMode, LineClassifier, RunStats, StreamAggregator, DEFAULT_LATENCY_THRESHOLD_SECS,
};
use slice_report::{ArchiveManifest, Archiver, ReportWriter};
use tracing::{info, warn};

use crate::error::CliError;

/// Reason recorded for alerts flagged `ignore`.
pub const IGNORED: &str = "ignored";

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root for incident folders and reports.
    pub output_dir: PathBuf,
    /// Window radius.
    pub radius: Duration,
    /// Category to log family mapping.
    pub path_rule: PathRule,
    /// High-latency threshold in seconds.
    pub latency_threshold: f64,
}

impl PipelineOptions {
    /// Default options writing under `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            radius: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            path_rule: PathRule::default(),
            latency_threshold: DEFAULT_LATENCY_THRESHOLD_SECS,
        }
    }
}

/// A fully processed alert.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedAlert {
    /// Alert subject.
    pub subject: String,
    /// Matched client.
    pub client: String,
    /// Alarm label.
    pub alarm_type: String,
    /// Log family read.
    pub family: LogFamily,
    /// Window start.
    pub window_start: DateTime<Utc>,
    /// Window end.
    pub window_end: DateTime<Utc>,
    /// Incident folder.
    pub folder: PathBuf,
    /// Files in the window.
    pub files: usize,
    /// Counters over those files.
    pub stats: RunStats,
    /// Report files written.
    pub reports: Vec<PathBuf>,
    /// Manifest written, if there were reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

/// What happened to one alert.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// Reports were produced (possibly none, if the window was clean).
    Processed(ProcessedAlert),
    /// The alert was not processed.
    Skipped {
        /// Alert subject.
        subject: String,
        /// Why.
        reason: String,
    },
}

impl AlertOutcome {
    fn skipped(alert: &AlertRecord, reason: impl Into<String>) -> Self {
        Self::Skipped {
            subject: alert.subject.clone(),
            reason: reason.into(),
        }
    }
}

/// Outcomes of a batch, in alert order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One outcome per alert.
    pub alerts: Vec<AlertOutcome>,
}

impl RunSummary {
    /// Number of processed alerts.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.alerts
            .iter()
            .filter(|o| matches!(o, AlertOutcome::Processed(_)))
            .count()
    }

    /// Number of skipped alerts.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.alerts.len() - self.processed()
    }

    /// Counters summed over processed alerts.
    #[must_use]
    pub fn totals(&self) -> RunStats {
        let mut totals = RunStats::default();
        for outcome in &self.alerts {
            if let AlertOutcome::Processed(p) = outcome {
                totals.merge(&p.stats);
            }
        }
        totals
    }
}

/// Runs alerts through fetch, classification, reporting and archival.
pub struct IncidentPipeline<'a, S, A> {
    directory: &'a ClientDirectory,
    store: S,
    archiver: A,
    options: PipelineOptions,
}

impl<'a, S: RemoteStore, A: Archiver> IncidentPipeline<'a, S, A> {
    /// Creates a pipeline.
    pub fn new(directory: &'a ClientDirectory, store: S, archiver: A, options: PipelineOptions) -> Self {
        Self {
            directory,
            store,
            archiver,
            options,
        }
    }

    /// Processes `alerts` in order.
    pub async fn run(&self, alerts: &[AlertRecord]) -> RunSummary {
        let mut summary = RunSummary::default();
        for alert in alerts {
            let outcome = match self.process(alert).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(subject = %alert.subject, error = %e, "skipping alert");
                    AlertOutcome::skipped(alert, e.to_string())
                }
            };
            summary.alerts.push(outcome);
        }
        info!(
            processed = summary.processed(),
            skipped = summary.skipped(),
            "run finished"
        );
        summary
    }

    /// Processes one alert.
    pub async fn process(&self, alert: &AlertRecord) -> Result<AlertOutcome, CliError> {
        if alert.ignore {
            info!(subject = %alert.subject, "alert flagged ignore");
            return Ok(AlertOutcome::skipped(alert, IGNORED));
        }

        let resolved = WindowResolver::new(self.directory)
            .with_path_rule(self.options.path_rule)
            .with_radius(self.options.radius)
            .resolve(alert)?;
        info!(
            client = %resolved.client_key,
            category = %resolved.category,
            path = %resolved.remote_path,
            window = %resolved.window,
            "resolved alert"
        );

        let fetched = fetch_window(&self.store, &resolved, &self.options.output_dir).await?;
        let mode = mode_for(&resolved);
        let classifier = LineClassifier::with_latency_threshold(self.options.latency_threshold);
        let mut aggregator = StreamAggregator::with_classifier(mode, classifier);

        let mut writer = ReportWriter::begin(&fetched.folder, mode)?;
        let stats = aggregator.process_files(&fetched.files, |report| writer.write(report))?;
        let reports = writer.finish();

        let manifest = ArchiveManifest::for_reports(&resolved.folder_name, &reports);
        let manifest = if manifest.is_empty() {
            info!(folder = %resolved.folder_name, "nothing to archive");
            None
        } else {
            Some(self.archiver.archive(&manifest)?)
        };

        Ok(AlertOutcome::Processed(ProcessedAlert {
            subject: alert.subject.clone(),
            client: resolved.client_key,
            alarm_type: resolved.alarm_type,
            family: resolved.family,
            window_start: resolved.window.lower,
            window_end: resolved.window.upper,
            folder: fetched.folder,
            files: fetched.files.len(),
            stats,
            reports,
            manifest,
        }))
    }
}

/// 4xx alerts report client errors; everything else reports server errors
/// and latency.
#[must_use]
pub fn mode_for(resolved: &ResolvedAlert) -> AggregationMode {
    if resolved.category.is_client_errors() {
        AggregationMode::ClientErrors
    } else {
        AggregationMode::ServerErrorsAndLatency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_alerts::{AlertCategory, ClientMapEntry};
    use slice_fetch::{FetchError, LocalMirror};
    use slice_report::ManifestArchiver;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    fn directory() -> ClientDirectory {
        ClientDirectory::new().with_client(
            "ACME",
            ClientMapEntry::new("s3://bucket/acme-elb", "s3://bucket/acme-alb").alias("acme"),
        )
    }

    fn line(time: &str, target: &str, status: &str, url: &str) -> String {
        format!(
            "https {time} app/lb/1 10.0.0.1:1 10.0.0.2:80 0.001 {target} 0.000 {status} {status} 10 20 \"GET {url} HTTP/1.1\" \"ua\"\n"
        )
    }

    fn seed(mirror: &Path, family: &str, stamp: &str, body: &str) {
        let day = mirror.join(format!("bucket/acme-{family}/2024/01/10"));
        fs::create_dir_all(&day).expect("mkdir");
        fs::write(
            day.join(format!("123_elasticloadbalancing_eu-west-1_acme_{stamp}Z_10.0.0.1_x.log")),
            body,
        )
        .expect("write log");
    }

    fn alert(category: AlertCategory) -> AlertRecord {
        AlertRecord::new(category, "ALERT - acme - threshold crossed", "2024-01-10").with_utc_time("12:00:00")
    }

    #[tokio::test]
    async fn server_error_alert_end_to_end() {
        let mirror = tempfile::tempdir().expect("mirror");
        let out = tempfile::tempdir().expect("out");
        let body = [
            line("2024-01-10T12:00:01Z", "0.100", "502", "/a"),
            line("2024-01-10T12:00:02Z", "3.000", "200", "/slow"),
            line("2024-01-10T12:00:03Z", "0.100", "200", "/ok"),
        ]
        .concat();
        seed(mirror.path(), "elb", "20240110T1200", &body);
        seed(mirror.path(), "elb", "20240110T1300", &body);

        let directory = directory();
        let pipeline = IncidentPipeline::new(
            &directory,
            LocalMirror::new(mirror.path()),
            ManifestArchiver::new(out.path()),
            PipelineOptions::new(out.path()),
        );
        let summary = pipeline.run(&[alert(AlertCategory::ServerErrors)]).await;

        assert_eq!(summary.processed(), 1);
        let AlertOutcome::Processed(p) = &summary.alerts[0] else {
            panic!("expected processed alert, got {:?}", summary.alerts[0]);
        };
        assert_eq!(p.client, "ACME");
        assert_eq!(p.family, LogFamily::Elb);
        assert_eq!(p.files, 1);
        assert_eq!(p.stats.requests, 3);
        assert_eq!(p.stats.errors, 1);
        assert_eq!(p.stats.high_latency, 1);
        assert_eq!(p.reports.len(), 3);

        let folder = out.path().join("ACME-5xx-20240110-120000");
        assert_eq!(p.folder, folder);
        let urls = fs::read_to_string(out.path().join("ACME-5xx-20240110-120000-5xx-urls.txt"))
            .expect("urls report");
        assert_eq!(urls, "2024-01-10T12:00:01Z : /a 0.101s 502\n");
        let slow = fs::read_to_string(out.path().join("ACME-5xx-20240110-120000-highresponse-urls.txt"))
            .expect("latency report");
        assert_eq!(slow, "2024-01-10T12:00:02Z : /slow 3.001s 200\n");
        assert_eq!(
            p.manifest.as_deref(),
            Some(out.path().join("ACME-5xx-20240110-120000.zip.manifest.json").as_path())
        );
    }

    #[tokio::test]
    async fn failures_are_skipped_and_batch_continues() {
        let mirror = tempfile::tempdir().expect("mirror");
        let out = tempfile::tempdir().expect("out");
        seed(
            mirror.path(),
            "elb",
            "20240110T1200",
            &line("2024-01-10T12:00:01Z", "0.100", "404", "/missing"),
        );

        let mut ignored = alert(AlertCategory::ClientErrors);
        ignored.ignore = true;
        let unknown = AlertRecord::new(AlertCategory::ClientErrors, "ALERT - globex", "2024-01-10");

        let directory = directory();
        let pipeline = IncidentPipeline::new(
            &directory,
            LocalMirror::new(mirror.path()),
            ManifestArchiver::new(out.path()),
            PipelineOptions::new(out.path()),
        );
        let summary = pipeline
            .run(&[ignored, unknown, alert(AlertCategory::ClientErrors)])
            .await;

        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.skipped(), 2);
        assert!(matches!(
            &summary.alerts[0],
            AlertOutcome::Skipped { reason, .. } if reason == IGNORED
        ));
        assert!(matches!(
            &summary.alerts[1],
            AlertOutcome::Skipped { reason, .. } if reason.contains("client key not matched")
        ));
        let urls = fs::read_to_string(out.path().join("ACME-4xx-20240110-120000-urls.txt"))
            .expect("urls report");
        assert_eq!(urls, "/missing\n");
        assert_eq!(summary.totals().errors, 1);
    }

    /// A mirror whose listings fail for one prefix.
    struct UnreachablePrefix {
        mirror: LocalMirror,
        prefix: &'static str,
        listed: RefCell<Vec<String>>,
    }

    impl RemoteStore for UnreachablePrefix {
        async fn list(&self, prefix: &str) -> slice_fetch::Result<Vec<String>> {
            self.listed.borrow_mut().push(prefix.to_string());
            if prefix.starts_with(self.prefix) {
                return Err(FetchError::list("connection reset by peer"));
            }
            self.mirror.list(prefix).await
        }

        async fn fetch(&self, prefix: &str, name: &str, dest: &Path) -> slice_fetch::Result<PathBuf> {
            self.mirror.fetch(prefix, name, dest).await
        }
    }

    #[tokio::test]
    async fn transport_failure_skips_only_that_alert() {
        let mirror = tempfile::tempdir().expect("mirror");
        let out = tempfile::tempdir().expect("out");
        seed(
            mirror.path(),
            "elb",
            "20240110T1200",
            &line("2024-01-10T12:00:01Z", "0.100", "503", "/down"),
        );

        let directory = ClientDirectory::new()
            .with_client(
                "GLOBEX",
                ClientMapEntry::new("s3://offline/globex-elb", "s3://offline/globex-alb"),
            )
            .with_client(
                "ACME",
                ClientMapEntry::new("s3://bucket/acme-elb", "s3://bucket/acme-alb").alias("acme"),
            );
        let store = UnreachablePrefix {
            mirror: LocalMirror::new(mirror.path()),
            prefix: "s3://offline/",
            listed: RefCell::new(Vec::new()),
        };
        let pipeline = IncidentPipeline::new(
            &directory,
            store,
            ManifestArchiver::new(out.path()),
            PipelineOptions::new(out.path()),
        );
        let unreachable =
            AlertRecord::new(AlertCategory::ServerErrors, "ALERT - GLOBEX - 5xx", "2024-01-10")
                .with_utc_time("12:00:00");
        let summary = pipeline
            .run(&[unreachable, alert(AlertCategory::ServerErrors)])
            .await;

        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.processed(), 1);
        assert!(matches!(
            &summary.alerts[0],
            AlertOutcome::Skipped { subject, reason }
                if subject == "ALERT - GLOBEX - 5xx" && reason.contains("connection reset")
        ));
        assert_eq!(
            *pipeline.store.listed.borrow(),
            vec![
                "s3://offline/globex-elb/2024/01/10/".to_string(),
                "s3://bucket/acme-elb/2024/01/10/".to_string(),
            ]
        );

        let urls = fs::read_to_string(out.path().join("ACME-5xx-20240110-120000-5xx-urls.txt"))
            .expect("urls report");
        assert_eq!(urls, "2024-01-10T12:00:01Z : /down 0.101s 503\n");
        assert!(out.path().join("ACME-5xx-20240110-120000-5xx-rawlog.txt").exists());
        assert!(!out.path().join("GLOBEX-5xx-20240110-120000-5xx-urls.txt").exists());
    }

    #[test]
    fn mode_follows_category() {
        let directory = directory();
        let resolver = WindowResolver::new(&directory);
        let resolve = |c| resolver.resolve(&alert(c)).expect("resolve");
        assert_eq!(mode_for(&resolve(AlertCategory::ClientErrors)), AggregationMode::ClientErrors);
        assert_eq!(
            mode_for(&resolve(AlertCategory::TargetResponseTime)),
            AggregationMode::ServerErrorsAndLatency
        );
    }
}
