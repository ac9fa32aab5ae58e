//! CLI tests driving the bondlog binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{sample_tar_bz2, write_file};

/// bondlog with an isolated config path.
fn bondlog(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bondlog"));
    cmd.env("BONDLOG_CONFIG", config_dir.join("config.toml"))
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    bondlog(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("telemetry"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("worker"));
}

#[test]
fn merge_prints_plain_text() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    bondlog(temp.path())
        .arg("merge")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "# Merged messages.log files in chronological order",
        ))
        .stdout(predicate::str::contains("# Source: messages.log.1.gz (rotation 1)"));
}

#[test]
fn merge_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let out = temp.path().join("merged.log");
    bondlog(temp.path())
        .args(["merge", "--end", "2025-09-23 12:00:03", "-o"])
        .arg(&out)
        .arg(&archive)
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("#   Lines included: 3 of 5"));
    assert!(!text.contains("Stop command"));
}

#[test]
fn merge_json_envelope() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let output = bondlog(temp.path())
        .args(["merge", "--json"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["metadata"]["total_files"], 2);
    assert!(json["content"].as_str().unwrap().contains("current second"));
}

#[test]
fn telemetry_prints_records() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let output = bondlog(temp.path())
        .arg("telemetry")
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metrics_count"], 2);
    assert_eq!(json["metrics"][0]["timestamp"], "2025-09-23T12:00:05");
    assert_eq!(json["metrics"][0]["bandwidth_mbps"], 1.5);
    assert_eq!(json["analytics"]["overall_statistics"]["modem_count"], 2);
    assert_eq!(json["analytics"]["per_modem_statistics"][1]["modem_id"], 2);
    assert_eq!(json["analytics"]["quality_insights"]["total_samples"], 2);
}

#[test]
fn telemetry_accepts_downsample_flag() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let output = bondlog(temp.path())
        .args(["telemetry", "--downsample"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metrics"].as_array().unwrap().len(), 2);
}

#[test]
fn sessions_prints_report() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let output = bondlog(temp.path())
        .arg("sessions")
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_sessions"], 1);
    assert_eq!(json["sessions"][0]["final_status"], "streaming");
    assert_eq!(json["sessions"][0]["timeline"][0]["kind"], "transition");
}

#[test]
fn unsupported_archive_fails_with_envelope() {
    let temp = TempDir::new().unwrap();
    let archive = write_file(temp.path(), "unit.zip", b"PK");
    bondlog(temp.path())
        .arg("telemetry")
        .arg(&archive)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("unsupported_format"));
}

#[test]
fn missing_archive_fails() {
    let temp = TempDir::new().unwrap();
    bondlog(temp.path())
        .args(["merge", "does-not-exist.tar"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.tar"));
}

#[test]
fn worker_processes_job_file() {
    let temp = TempDir::new().unwrap();
    let objects = temp.path().join("objects");
    write_file(&objects, "unit.tar.bz2", &sample_tar_bz2());
    let job = write_file(
        temp.path(),
        "job.json",
        br#"{"session_id": "s-9", "object_name": "unit.tar.bz2", "filename": "unit.tar.bz2"}"#,
    );
    let store = temp.path().join("out").join("telemetry.jsonl");

    bondlog(temp.path())
        .arg("worker")
        .arg(&job)
        .arg("--objects")
        .arg(&objects)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"completed\""))
        .stdout(predicate::str::contains("\"metrics_count\": 2"));
    assert_eq!(fs::read_to_string(&store).unwrap().lines().count(), 2);
}

#[test]
fn config_show_uses_override_path() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "[merge]\nlog_name = \"system.log\"\n",
    )
    .unwrap();
    bondlog(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("log_name = \"system.log\""))
        .stdout(predicate::str::contains("parallel = true"));
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    bondlog(temp.path())
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bondlog"));
}
