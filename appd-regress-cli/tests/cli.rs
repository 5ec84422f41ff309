//! End-to-end tests of the `appd-regress` binary.

use appd_regress::{BuildReport, MetricSeries, MetricValue, Report, FIXED_METRIC_PATHS};
use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use std::path::Path;

fn appd_regress(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("appd-regress").unwrap();
    cmd.current_dir(dir)
        .env_remove("APPD_PASSWORD")
        .env("RUST_LOG", "warn")
        .arg("--no-color");
    cmd
}

fn write_config(dir: &Path, uri: &str) {
    std::fs::write(
        dir.join("appd-regress.toml"),
        format!(
            r#"
[controller]
uri = "{uri}"
username = "ci"
application = "Shop"
"#
        ),
    )
    .unwrap();
}

fn store_build(history: &Path, build_id: u64, value: i64) {
    std::fs::create_dir_all(history).unwrap();
    let report = Report::new(
        build_id as i64 * 3_600_000,
        10,
        vec![MetricSeries::new(
            FIXED_METRIC_PATHS[0],
            vec![MetricValue::flat(value)],
        )],
    );
    let json = serde_json::to_string(&BuildReport::new(build_id, report)).unwrap();
    std::fs::write(history.join(format!("build-{build_id}.json")), json).unwrap();
}

/// Controller answering the connection check, the application lookup and
/// the threshold metric with a single `value` sample.
fn controller(value: i64) -> ServerGuard {
    let mut server = Server::new();
    server
        .mock("GET", "/controller/rest/applications/Shop/business-transactions/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create();
    server
        .mock("GET", "/controller/rest/applications/Shop/metric-data")
        .match_query(Matcher::UrlEncoded(
            "metric-path".into(),
            FIXED_METRIC_PATHS[0].into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"[{{"metricPath": "{}", "metricValues": [{{"value": {value}, "min": {value}, "max": {value}}}]}}]"#,
            FIXED_METRIC_PATHS[0]
        ))
        .create();
    server
        .mock("GET", "/controller/rest/applications/Shop/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 9, "name": "Shop"}]"#)
        .create();
    server
}

// ─── init ───

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    appd_regress(dir.path()).arg("init").assert().success();

    let content = std::fs::read_to_string(dir.path().join("appd-regress.toml")).unwrap();
    assert!(content.contains("unstable_threshold = 80"));
    assert!(content.contains("failed_threshold = 65"));

    appd_regress(dir.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    appd_regress(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

// ─── paths ───

#[test]
fn test_paths_lists_fixed_and_custom() {
    let dir = tempfile::tempdir().unwrap();
    appd_regress(dir.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains(FIXED_METRIC_PATHS[0]))
        .stdout(predicate::str::contains(FIXED_METRIC_PATHS[7]))
        .stdout(predicate::str::contains("Custom metric path"));
}

// ─── run ───

#[test]
fn test_run_without_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    appd_regress(dir.path())
        .args(["run", "--build-id", "1", "--build-start", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_run_requires_password() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "http://127.0.0.1:1");
    appd_regress(dir.path())
        .args(["run", "--build-id", "1", "--build-start", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("APPD_PASSWORD"));
}

#[test]
fn test_run_rejects_bad_build_start() {
    let dir = tempfile::tempdir().unwrap();
    appd_regress(dir.path())
        .args(["run", "--build-id", "1", "--build-start", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}

#[test]
fn test_run_against_unreachable_controller_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "http://127.0.0.1:1");
    appd_regress(dir.path())
        .env("APPD_PASSWORD", "secret")
        .args(["run", "--build-id", "4", "--build-start", "2023-11-14T22:13:20Z"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("could not be established"))
        .stdout(predicate::str::contains("FAILURE"));

    assert!(!dir.path().join(".appd-regress/history/build-4.json").exists());
}

#[test]
fn test_run_evaluates_stores_and_excludes_itself_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    store_build(&dir.path().join("history"), 1, 200);

    // 200 / 250 scores 80: exactly on the unstable threshold.
    let server = controller(250);
    write_config(dir.path(), &server.url());
    appd_regress(dir.path())
        .env("APPD_PASSWORD", "secret")
        .args(["run", "--build-id", "2", "--build-start", "1700000000000"])
        .args(["--history-dir", "history"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("80.0%"))
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("200.00 (1 builds)"));

    let stored = dir.path().join("history/build-2.json");
    assert!(stored.exists());
    let stored: BuildReport =
        serde_json::from_str(&std::fs::read_to_string(&stored).unwrap()).unwrap();
    assert_eq!(stored.build_id, 2);
    assert_eq!(stored.report.average(FIXED_METRIC_PATHS[0]).unwrap(), 250.0);

    // Rerun of build 2 at another start time: only build 1 forms the
    // baseline, so 200 / 270 scores 74.1 and the build is unstable.
    let server = controller(270);
    write_config(dir.path(), &server.url());
    appd_regress(dir.path())
        .env("APPD_PASSWORD", "secret")
        .args(["run", "--build-id", "2", "--build-start", "1700000600000"])
        .args(["--history-dir", "history"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("74.1%"))
        .stdout(predicate::str::contains("UNSTABLE"))
        .stdout(predicate::str::contains("200.00 (1 builds)"));
}

// ─── check ───

#[test]
fn test_check_reports_unreachable_controller() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "http://127.0.0.1:1");
    appd_regress(dir.path())
        .args(["check", "--password", "secret"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("FAILED"));
}

// ─── trend ───

#[test]
fn test_trend_prints_builds_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history");
    store_build(&history, 12, 300);
    store_build(&history, 3, 150);

    let output = appd_regress(dir.path())
        .args(["trend", "--history-dir", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Average Response Time (ms)"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let first = text.find("#3").unwrap();
    let second = text.find("#12").unwrap();
    assert!(first < second);
    assert!(text.contains("150.00"));
    assert!(text.contains("300.00"));
}

#[test]
fn test_trend_without_history() {
    let dir = tempfile::tempdir().unwrap();
    appd_regress(dir.path())
        .args(["trend", "--metric", "A|B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no data for A|B"));
}
