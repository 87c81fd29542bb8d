//! End-to-end tests for the alert → window → classify → report flow.
//!
//! These tests verify:
//! 1. Window resolution from an alert date and time
//! 2. Client matching from a subject line
//! 3. Inclusive window boundaries during file selection
//! 4. 4xx aggregation from a file with a comment line
//! 5. High-latency ordering
//! 6. Gzip input and unreadable files
//! 7. Re-running an alert

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;

use slice_alerts::{AlertCategory, AlertRecord, ClientDirectory, ClientMapEntry, WindowResolver};
use slice_cli::{AlertOutcome, IncidentPipeline, PipelineOptions};
use slice_fetch::{fetch_window, FileSelector, LocalMirror};
use slice_logs::{AggregationMode, StreamAggregator};
use slice_report::{ManifestArchiver, ReportWriter};

fn acme() -> ClientDirectory {
    ClientDirectory::new().with_client(
        "ACME",
        ClientMapEntry::new("s3://logs/acme-elb", "s3://logs/acme-alb"),
    )
}

fn alert(category: AlertCategory) -> AlertRecord {
    AlertRecord::new(category, "ALERT - ACME - 4xx errors", "2024-01-10").with_utc_time("12:00:00")
}

fn alb_line(time: &str, target_secs: &str, status: &str, url: &str) -> String {
    format!(
        "https {time} app/acme/1 10.0.0.1:1 10.0.0.2:80 0 {target_secs} 0 {status} {status} 1 2 \"GET {url} HTTP/1.1\" \"ua\"\n"
    )
}

fn log_name(stamp: &str) -> String {
    format!("1_elasticloadbalancing_eu-west-1_app.acme_{stamp}Z_10.0.0.1_x.log")
}

fn mirror_day(root: &Path) -> PathBuf {
    let day = root.join("logs/acme-elb/2024/01/10");
    fs::create_dir_all(&day).expect("mkdir mirror");
    day
}

fn gz(body: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).expect("compress");
    encoder.finish().expect("finish gzip")
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_window_round_trip() {
    let directory = acme();
    let resolved = WindowResolver::new(&directory)
        .resolve(&alert(AlertCategory::ClientErrors))
        .expect("resolve");

    assert_eq!(
        resolved.window.lower,
        Utc.with_ymd_and_hms(2024, 1, 10, 11, 45, 0).single().expect("valid instant")
    );
    assert_eq!(
        resolved.window.upper,
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 15, 0).single().expect("valid instant")
    );
    assert_eq!(resolved.remote_path, "s3://logs/acme-elb/2024/01/10/");
}

#[test]
fn test_subject_matches_client_key_without_alias() {
    let directory = acme();
    assert_eq!(directory.match_subject("ALERT - ACME - 4xx errors"), Some("ACME"));
    let resolved = WindowResolver::new(&directory)
        .resolve(&alert(AlertCategory::ClientErrors))
        .expect("resolve");
    assert_eq!(resolved.client_key, "ACME");
}

// ============================================================================
// File selection
// ============================================================================

#[tokio::test]
async fn test_window_boundaries_are_inclusive() {
    let mirror = tempfile::tempdir().expect("mirror");
    let day = mirror_day(mirror.path());
    for stamp in ["20240110T1140", "20240110T1145", "20240110T1215", "20240110T1220"] {
        fs::write(day.join(log_name(stamp)), "").expect("seed");
    }

    let directory = acme();
    let resolved = WindowResolver::new(&directory)
        .resolve(&alert(AlertCategory::ClientErrors))
        .expect("resolve");
    let out = tempfile::tempdir().expect("out");
    let outcome = fetch_window(&LocalMirror::new(mirror.path()), &resolved, out.path())
        .await
        .expect("fetch");

    let names: Vec<String> = outcome
        .files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, vec![log_name("20240110T1145"), log_name("20240110T1215")]);
}

#[test]
fn test_file_without_timestamp_is_discarded() {
    let directory = acme();
    let resolved = WindowResolver::new(&directory)
        .resolve(&alert(AlertCategory::ClientErrors))
        .expect("resolve");
    let folder = tempfile::tempdir().expect("folder");
    fs::write(folder.path().join("notes.log"), "").expect("seed");
    fs::write(folder.path().join(log_name("20240110T1200")), "").expect("seed");

    let kept = FileSelector::new(resolved.window)
        .prune_directory(folder.path())
        .expect("prune");
    assert_eq!(kept, vec![folder.path().join(log_name("20240110T1200"))]);
    assert!(!folder.path().join("notes.log").exists());
}

// ============================================================================
// Aggregation and reports
// ============================================================================

#[test]
fn test_client_error_file_with_comment() {
    let body = format!("# comment\n{}", alb_line("2024-01-10T12:00:00Z", "1", "404", "/foo"));
    let mut aggregator = StreamAggregator::new(AggregationMode::ClientErrors);
    let report = aggregator
        .process_reader(Path::new("a.log"), Cursor::new(body))
        .expect("aggregate");

    assert_eq!(report.error_urls, vec!["/foo".to_string()]);
    assert_eq!(aggregator.stats().requests, 1);
    assert_eq!(aggregator.stats().errors, 1);
}

#[test]
fn test_high_latency_ordering() {
    let body = [
        alb_line("A", "5", "200", "/a"),
        alb_line("B", "5", "200", "/b"),
        alb_line("C", "3", "200", "/c"),
        alb_line("D", "1.5", "200", "/d"),
    ]
    .concat();
    let mut aggregator = StreamAggregator::new(AggregationMode::ServerErrorsAndLatency);
    let report = aggregator
        .process_reader(Path::new("a.log"), Cursor::new(body))
        .expect("aggregate");

    assert_eq!(
        report.high_latency_lines(),
        vec!["B : /b 5s 200", "A : /a 5s 200", "C : /c 3s 200"]
    );
}

#[test]
fn test_gzip_and_unreadable_files() {
    let folder = tempfile::tempdir().expect("folder");
    let plain = folder.path().join("a.log");
    let packed = folder.path().join("b.log.gz");
    let broken = folder.path().join("c.log.gz");
    fs::write(&plain, alb_line("t1", "0.1", "503", "/plain")).expect("plain");
    fs::write(&packed, gz(&alb_line("t2", "0.1", "504", "/packed"))).expect("gz");
    fs::write(&broken, b"definitely not gzip").expect("broken");

    let dir = folder.path().join("incident");
    let mut writer = ReportWriter::begin(&dir, AggregationMode::ServerErrorsAndLatency)
        .expect("begin");
    let mut aggregator = StreamAggregator::new(AggregationMode::ServerErrorsAndLatency);
    let stats = aggregator
        .process_files(&[plain, broken, packed], |report| writer.write(report))
        .expect("process");
    let reports = writer.finish();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.unreadable_files, 1);
    assert_eq!(reports.len(), 2);
    let urls = fs::read_to_string(folder.path().join("incident-5xx-urls.txt")).expect("urls");
    assert_eq!(urls, "t1 : /plain 0.1s 503\nt2 : /packed 0.1s 504\n");
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn test_rerun_produces_identical_reports() {
    let mirror = tempfile::tempdir().expect("mirror");
    let day = mirror_day(mirror.path());
    fs::write(
        day.join(format!("{}.gz", log_name("20240110T1200"))),
        gz(&[
            alb_line("2024-01-10T12:00:01Z", "0.1", "404", "/x"),
            alb_line("2024-01-10T12:00:02Z", "0.1", "404", "/y"),
        ]
        .concat()),
    )
    .expect("seed");

    let out = tempfile::tempdir().expect("out");
    let directory = acme();
    let pipeline = IncidentPipeline::new(
        &directory,
        LocalMirror::new(mirror.path()),
        ManifestArchiver::new(out.path()),
        PipelineOptions::new(out.path()),
    );
    let alerts = [alert(AlertCategory::ClientErrors)];

    let first = pipeline.run(&alerts).await;
    let urls_path = out.path().join("ACME-4xx-20240110-120000-urls.txt");
    let after_first = fs::read_to_string(&urls_path).expect("urls");
    let second = pipeline.run(&alerts).await;
    let after_second = fs::read_to_string(&urls_path).expect("urls");

    assert_eq!(after_first, "/x\n/y\n");
    assert_eq!(after_first, after_second);
    assert_eq!(first.processed(), 1);
    assert_eq!(second.processed(), 1);

    let AlertOutcome::Processed(processed) = &second.alerts[0] else {
        panic!("expected processed alert");
    };
    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(processed.manifest.as_ref().expect("manifest path")).expect("manifest"),
    )
    .expect("manifest json");
    assert_eq!(manifest["archive_name"], "ACME-4xx-20240110-120000.zip");
    assert_eq!(manifest["entries"].as_array().map(Vec::len), Some(2));
}
