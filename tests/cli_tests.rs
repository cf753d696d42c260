//! End-to-end tests for the ravcat binary.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::fixtures::{fixture_path, load_json_fixture};
use common::wiremock_helpers::mock_json_server;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: get a Command for the ravcat binary.
fn ravcat() -> assert_cmd::Command {
    cargo_bin_cmd!("ravcat")
}

/// Helper: write a config file into `tmp` and return its path.
fn write_config(tmp: &TempDir, content: &str) -> PathBuf {
    let path = tmp.path().join("ravcat.toml");
    fs::write(&path, content).unwrap();
    path
}

/// A source nobody listens on, tried once.
const OFFLINE: &str = r#"
url = "http://127.0.0.1:9/directory.json"
retry_attempts = 1
timeout_ms = 1000
"#;

#[tokio::test(flavor = "multi_thread")]
async fn test_company_lookup_by_substring() {
    let server = mock_json_server("/report.json", load_json_fixture("companies.json"), 1).await;
    let tmp = TempDir::new().expect("create temp dir");
    let config = write_config(&tmp, &format!("[companies]\nurl = \"{}/report.json\"\n", server.uri()));

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["company", "micro"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("Microsoft [form]"))
        .stdout(predicate::str::contains("https://msrc.microsoft.com/report/abuse"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_company_exits_with_error() {
    let server = mock_json_server("/report.json", load_json_fixture("companies.json"), 1).await;
    let tmp = TempDir::new().expect("create temp dir");
    let config = write_config(&tmp, &format!("[companies]\nurl = \"{}/report.json\"\n", server.uri()));

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["company", "myspace"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vendor_list_counts_classifications() {
    let server = mock_json_server("/vtfp.json", load_json_fixture("vendors_legacy.json"), 1).await;
    let tmp = TempDir::new().expect("create temp dir");
    let config = write_config(&tmp, &format!("[vendors]\nurl = \"{}/vtfp.json\"\n", server.uri()));

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["list", "--vendors"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("4 entries (email: 1, form: 1, multiple: 2)"))
        .stdout(predicate::str::contains("1. Acronis [email]"));
}

#[test]
fn test_offline_company_without_fallback_fails() {
    let tmp = TempDir::new().expect("create temp dir");
    let config = write_config(&tmp, &format!("[companies]{}", OFFLINE));

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["company", "google"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No company data available"));
}

#[test]
fn test_offline_vendor_without_fallback_lists_nothing() {
    let tmp = TempDir::new().expect("create temp dir");
    let config = write_config(&tmp, &format!("[vendors]{}", OFFLINE));

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["list", "--vendors"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 entries"));
}

#[test]
fn test_offline_vendor_uses_fallback_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let fallback = fixture_path("vendors_legacy.json");
    let config = write_config(
        &tmp,
        &format!("[vendors]{}fallback_file = {:?}\n", OFFLINE, fallback.display().to_string()),
    );

    ravcat()
        .arg("--config")
        .arg(&config)
        .args(["vendor", "bitdef"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("BitDefender [multiple]"))
        .stdout(predicate::str::contains("offline data"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let tmp = TempDir::new().expect("create temp dir");

    ravcat()
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .args(["company", "google"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_init_creates_config_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let config_path = tmp.path().join("config").join("ravcat.toml");

    ravcat()
        .current_dir(tmp.path())
        .arg("init")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[companies]"), "config should have [companies] section");
    assert!(content.contains("[vendors]"), "config should have [vendors] section");
}

#[test]
fn test_help_works_without_config() {
    let tmp = TempDir::new().expect("create temp dir");

    ravcat()
        .current_dir(tmp.path())
        .arg("--help")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("company"))
        .stdout(predicate::str::contains("vendor"));
}
