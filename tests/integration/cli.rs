//! Argument surface of the `docket` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn docket() -> Command {
    let mut cmd = Command::cargo_bin("docket").unwrap();
    cmd.env_remove("GITHUB_TOKEN").env("RUST_LOG", "error");
    cmd
}

#[test]
fn test_help_lists_commands() {
    docket()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("docs"))
        .stdout(predicate::str::contains("versioned"))
        .stdout(predicate::str::contains("placeholder"));
}

#[test]
fn test_docs_requires_report_and_output() {
    docket()
        .args(["docs", "--output-path", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLUGINS_JSON"));

    docket().args(["docs", "report.json"]).assert().failure().stderr(predicate::str::contains("--output-path"));
}

#[test]
fn test_versioned_rejects_malformed_since() {
    docket()
        .args(["versioned", "--output-path", "out", "--since", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_missing_settings_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");
    std::fs::write(&report, r#"{"successful": {}}"#).unwrap();

    docket()
        .current_dir(temp.path())
        .args(["docs", "--output-path", "out", "--settings", "missing.yml"])
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yml"));
}

#[test]
fn test_placeholder_rejects_other_types() {
    let temp = TempDir::new().unwrap();

    docket()
        .args(["placeholder", "--plugin-type", "input", "--plugin-name", "acme", "--output-path"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("input"));
    assert!(!temp.path().join("logstash-docs").exists());
}
