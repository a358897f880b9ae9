//! End-to-end runs of the rpm-check binary against saved probe results.
//! `sh` stands in for the device CLI so action commands really execute.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn demo_results() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/probe-results.xml")
}

/// `rpm-check` reading the demo results, no log file, working in `dir`.
fn rpm_check(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo_bin_cmd!("rpm-check");
    cmd.current_dir(dir)
        .env_remove("RPM_CHECK_CLI_PATH")
        .env_remove("RPM_CHECK_LOG_FILE")
        .args(["--rpm-owner", "probe1", "--no-log-file", "--cli-path", "sh"])
        .arg("--input")
        .arg(demo_results());
    cmd
}

fn read_json_report(path: &Path) -> Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_json_report_counts_and_verdicts() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("report.json");

    rpm_check(dir.path())
        .args(["--pass-threshold", "70", "--fail-threshold", "100", "--dry-run"])
        .args(["--pass-command", "echo up $ri", "--fail-command", "echo down $routing-instance-name"])
        .args(["--format", "json", "--output"])
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("rpm check ends"));

    let report = read_json_report(&report_path);
    let instances = report["instances"].as_array().unwrap();

    let names: Vec<&str> = instances.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["default", "vrf-red", "vrf-blue"]);

    assert_eq!(instances[0]["total"], 4);
    assert_eq!(instances[0]["pass_count"], 3);
    assert_eq!(instances[0]["fail_count"], 1);
    assert_eq!(instances[0]["pass_percent"], 75.0);
    assert_eq!(instances[0]["verdict"], "PASS");
    assert_eq!(instances[1]["verdict"], "FAIL");
    assert_eq!(instances[2]["verdict"], "UNDETERMINED");

    let commands: Vec<&str> = report["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["request"]["resolved_command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, vec!["echo up default", "echo down vrf-red"]);
    assert_eq!(report["actions"][0]["result"]["kind"], "skipped");
}

#[test]
fn test_commands_execute() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("report.json");

    rpm_check(dir.path())
        .args(["--pass-threshold", "70"])
        .args(["--pass-command", "echo restored $ri"])
        .args(["--format", "json", "--output"])
        .arg(&report_path)
        .assert()
        .success();

    let report = read_json_report(&report_path);
    assert_eq!(report["actions"].as_array().unwrap().len(), 1);
    assert_eq!(report["actions"][0]["result"]["kind"], "output");
    assert_eq!(report["actions"][0]["result"]["detail"], "restored default\n");
}

#[test]
fn test_failed_command_exits_2() {
    let dir = TempDir::new().unwrap();

    rpm_check(dir.path())
        .args(["--fail-threshold", "100", "--fail-command", "exit 1"])
        .args(["--pass-command", "echo ok $ri"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("commands failed"));
}

#[test]
fn test_text_report_written() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("report.txt");

    rpm_check(dir.path())
        .arg("--dry-run")
        .arg("--output")
        .arg(&report_path)
        .assert()
        .success();

    let text = std::fs::read_to_string(&report_path).unwrap();
    assert!(text.contains("routing-instance operational status based on RPM"));
    assert!(text.contains("isp-a-ntp"));
    assert!(text.contains("75.00%"));
    assert!(!text.contains("lab-gw"));
}

#[test]
fn test_config_file_applies() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".rpm-check.toml"),
        "[thresholds]\npass = 100.0\nfail = 100.0\n\n[commands]\nfail = \"echo down $ri\"\n",
    )
    .unwrap();
    let report_path = dir.path().join("report.json");

    rpm_check(dir.path())
        .args(["--dry-run", "--format", "json", "--output"])
        .arg(&report_path)
        .assert()
        .success();

    let report = read_json_report(&report_path);
    assert_eq!(report["policy"]["pass_threshold"], 100.0);
    let commands: Vec<&str> = report["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["request"]["resolved_command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, vec!["echo down vrf-red"]);
}

#[test]
fn test_unreadable_source_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<probe-results>").unwrap();
    let report_path = dir.path().join("report.json");

    let mut cmd = assert_cmd::cargo_bin_cmd!("rpm-check");
    cmd.current_dir(dir.path())
        .args(["--rpm-owner", "probe1", "--no-log-file", "--format", "json"])
        .arg("--input")
        .arg(&broken)
        .arg("--output")
        .arg(&report_path)
        .assert()
        .success();

    let report = read_json_report(&report_path);
    assert!(report["instances"].as_array().unwrap().is_empty());
    assert!(report["source_error"].as_str().unwrap().contains("XML"));
}

#[test]
fn test_invalid_threshold_rejected() {
    let dir = TempDir::new().unwrap();

    rpm_check(dir.path())
        .args(["--pass-threshold", "nan"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pass threshold must be a finite number"));
}

#[test]
fn test_fail_threshold_above_100_disables_fail() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("report.json");

    rpm_check(dir.path())
        .args(["--pass-threshold", "70", "--fail-threshold", "101", "--dry-run"])
        .args(["--fail-command", "echo down $ri", "--format", "json", "--output"])
        .arg(&report_path)
        .assert()
        .success();

    let report = read_json_report(&report_path);
    let instances = report["instances"].as_array().unwrap();
    assert!(instances.iter().all(|i| i["verdict"] != "FAIL"));
    assert_eq!(instances[1]["verdict"], "UNDETERMINED");
    assert!(report["actions"].as_array().unwrap().is_empty());
}

#[test]
fn test_init_config() {
    let dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("rpm-check");
    cmd.current_dir(dir.path()).arg("--init-config").assert().success();

    let content = std::fs::read_to_string(dir.path().join(".rpm-check.toml")).unwrap();
    assert!(content.contains("[thresholds]"));
    assert!(content.contains("cli_path = \"/usr/sbin/cli\""));
}
