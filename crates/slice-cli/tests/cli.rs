//! Binary-level tests for `logslice`.

use std::fs;
use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;

fn logslice() -> Command {
    let mut cmd = Command::cargo_bin("logslice").expect("binary built");
    cmd.env_remove("LOGSLICE_CONFIG").env("RUST_LOG", "warn");
    cmd
}

fn write_gz(path: &Path, body: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).expect("compress");
    fs::write(path, encoder.finish().expect("finish gzip")).expect("write gz");
}

/// Settings, client map, alerts and a one-file mirror under `root`.
fn workspace(root: &Path) {
    fs::write(
        root.join("clients.json"),
        r#"{
            "ACME": {"aliases": ["acme", "Acme Corp"], "elb": "s3://bucket/acme-elb", "alb": "s3://bucket/acme-alb"}
        }"#,
    )
    .expect("clients");
    fs::write(
        root.join("alerts.json"),
        r#"[
            {"alarm_type": "5xx", "scripts_to_run": "5xx", "subject": "ALARM: \"Acme Corp\" - 5xx", "date": "2024-01-10", "utc_time": "12:00:00"},
            {"alarm_type": "5xx", "scripts_to_run": "5xx", "subject": "ALARM - unknown", "date": "2024-01-10", "utc_time": "12:00:00"}
        ]"#,
    )
    .expect("alerts");
    fs::write(
        root.join("logslice.json"),
        r#"{
            "client_map": "clients.json",
            "alerts": "alerts.json",
            "output_dir": "out",
            "store": {"kind": "local", "root": "mirror"}
        }"#,
    )
    .expect("settings");

    let day = root.join("mirror/bucket/acme-elb/2024/01/10");
    fs::create_dir_all(&day).expect("mkdir");
    write_gz(
        &day.join("9_elasticloadbalancing_eu-west-1_app.acme_20240110T1155Z_10.0.0.1_a.log.gz"),
        concat!(
            "https 2024-01-10T11:54:59Z app/acme/1 1.1.1.1:1 2.2.2.2:80 0.000 0.250 0.000 500 500 1 2 \"GET /boom HTTP/1.1\" \"ua\"\n",
            "https 2024-01-10T11:55:00Z app/acme/1 1.1.1.1:1 2.2.2.2:80 0.000 4.000 0.000 200 200 1 2 \"GET /slow HTTP/1.1\" \"ua\"\n",
        ),
    );
}

#[test]
fn help_lists_subcommands() {
    logslice()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn resolve_prints_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    workspace(dir.path());

    logslice()
        .arg("--config")
        .arg(dir.path().join("logslice.json"))
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("s3://bucket/acme-elb/2024/01/10/"))
        .stdout(predicate::str::contains("2024-01-10T11:45:00Z .. 2024-01-10T12:15:00Z"))
        .stdout(predicate::str::contains("client key not matched"));
}

#[test]
fn run_writes_reports_from_gzip_mirror() {
    let dir = tempfile::tempdir().expect("tempdir");
    workspace(dir.path());

    logslice()
        .env("LOGSLICE_CONFIG", dir.path().join("logslice.json"))
        .args(["--format", "json", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"processed\""))
        .stdout(predicate::str::contains("\"status\": \"skipped\""));

    let out = dir.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("ACME-5xx-20240110-120000-5xx-urls.txt")).expect("urls"),
        "2024-01-10T11:54:59Z : /boom 0.25s 500\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("ACME-5xx-20240110-120000-highresponse-urls.txt"))
            .expect("slow"),
        "2024-01-10T11:55:00Z : /slow 4s 200\n"
    );
    assert!(out.join("ACME-5xx-20240110-120000.zip.manifest.json").is_file());
}

#[test]
fn scan_missing_folder_fails() {
    logslice()
        .args(["scan", "/nonexistent/folder", "--mode", "4xx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn bad_settings_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = dir.path().join("logslice.json");
    fs::write(&settings, r#"{"window_minutes": 0}"#).expect("settings");

    logslice()
        .arg("-c")
        .arg(&settings)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}
