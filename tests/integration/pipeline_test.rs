//! Integration tests for the archive entry points

use bondlog::pipeline::{self, Outcome, Settings};
use bondlog::session::FinalStatus;
use bondlog::Error;
use tempfile::TempDir;

use crate::helpers::{body_lines, bz2, gz, sample_tar, sample_tar_bz2, tar_bytes};

fn settings() -> Settings {
    Settings::default()
}

#[test]
fn merge_orders_lines_across_segments() {
    let report = pipeline::merge_archive(&sample_tar_bz2(), "unit.tar.bz2", None, None, &settings())
        .unwrap();

    let body = body_lines(&report.content);
    assert_eq!(body.len(), 5);
    assert!(body[0].contains("Entering state \"Negotiating\""));
    assert_eq!(body[1], "2025-09-23T12:00:02 rotated first");
    assert_eq!(body[2], "2025-09-23T12:00:03 current second");
    assert!(body[4].contains("Stop command"));

    let meta = &report.metadata;
    assert_eq!(meta.total_files, 2);
    assert_eq!(
        meta.files_processed,
        vec!["messages.log.1.gz".to_string(), "messages.log".to_string()]
    );
    assert_eq!(meta.total_lines_processed, 5);
    assert_eq!(meta.lines_filtered_out, 0);

    let markers: Vec<&str> = report
        .content
        .lines()
        .filter(|l| l.starts_with("# Source:"))
        .collect();
    assert_eq!(
        markers,
        vec![
            "# Source: messages.log.1.gz (rotation 1)",
            "# Source: messages.log (rotation 0)",
        ]
    );
}

#[test]
fn merge_with_range_reports_filter() {
    let report = pipeline::merge_archive(
        &sample_tar(),
        "unit.tar",
        Some("2025-09-23 12:00:02"),
        Some("2025-09-23 12:00:05"),
        &settings(),
    )
    .unwrap();

    assert_eq!(
        body_lines(&report.content),
        vec![
            "2025-09-23T12:00:02 rotated first",
            "2025-09-23T12:00:03 current second",
        ]
    );
    assert_eq!(report.metadata.lines_filtered_out, 3);
    assert!(report.content.contains("# Date range filter applied:"));
    assert!(report.content.contains("#   From: 2025-09-23 12:00:02"));
    assert!(report.content.contains("#   Lines included: 2 of 5"));

    let json = serde_json::to_value(&report.metadata).unwrap();
    assert_eq!(json["filter_applied"]["start_datetime"], "2025-09-23T12:00:02");
    assert_eq!(json["time_range"]["earliest"], "2025-09-23T12:00:02");
}

#[test]
fn merge_with_custom_family_name() {
    let archive = tar_bytes(&[
        ("logs/system.log", b"2024-03-01T00:00:02 two\n".as_slice()),
        ("logs/system.log.1.gz", gz("2024-03-01T00:00:01 one\n").as_slice()),
    ]);
    let settings = Settings {
        log_name: "system.log".to_string(),
        ..Settings::default()
    };
    let report = pipeline::merge_archive(&archive, "a.tar", None, None, &settings).unwrap();
    assert!(report
        .content
        .starts_with("# Merged system.log files in chronological order\n"));
    assert_eq!(
        body_lines(&report.content),
        vec!["2024-03-01T00:00:01 one", "2024-03-01T00:00:02 two"]
    );
}

#[test]
fn merge_without_log_family_is_not_found() {
    let archive = tar_bytes(&[("etc/hostname", b"unit-7\n".as_slice())]);
    let err = pipeline::merge_archive(&archive, "a.tar", None, None, &settings()).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    let outcome: Outcome<bondlog::MergeReport> = Err(err).into();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error_kind"], "not_found");
}

#[test]
fn merge_of_single_bz2_member() {
    let payload = bz2(b"2024-01-15T10:00:01 b\n2024-01-15T10:00:00 a\n");
    let report = pipeline::merge_archive(&payload, "messages.log.bz2", None, None, &settings())
        .unwrap();
    assert_eq!(
        body_lines(&report.content),
        vec!["2024-01-15T10:00:00 a", "2024-01-15T10:00:01 b"]
    );
}

#[test]
fn telemetry_from_every_member() {
    let records =
        pipeline::extract_telemetry(&sample_tar_bz2(), "unit.tar.bz2", None, None, &settings())
            .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].modem_id, 1);
    assert_eq!(records[0].bandwidth_mbps, 1.5);
    assert_eq!(records[1].modem_id, 2);
    assert_eq!(records[1].bandwidth_mbps, 3.0);
}

#[test]
fn telemetry_date_only_end_is_inclusive_of_the_day() {
    let records = pipeline::extract_telemetry(
        &sample_tar(),
        "unit.tar",
        None,
        Some("2025-09-23"),
        &settings(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].modem_id, 1);
}

#[test]
fn telemetry_sequential_matches_parallel() {
    let sequential = Settings {
        parallel: false,
        ..Settings::default()
    };
    let parallel = Settings {
        parallel: true,
        ..Settings::default()
    };
    let a = pipeline::extract_telemetry(&sample_tar(), "u.tar", None, None, &sequential).unwrap();
    let b = pipeline::extract_telemetry(&sample_tar(), "u.tar", None, None, &parallel).unwrap();
    assert_eq!(a, b);
}

#[test]
fn no_matches_is_still_success() {
    let archive = tar_bytes(&[("notes.txt", b"nothing to see\n".as_slice())]);
    let outcome: Outcome<_> =
        pipeline::extract_telemetry(&archive, "a.tar", None, None, &settings())
            .map(pipeline::TelemetryReport::from)
            .into();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["metrics_count"], 0);
}

#[test]
fn sessions_are_rebuilt_across_segments() {
    let report =
        pipeline::analyze_sessions(&sample_tar_bz2(), "unit.tar.bz2", None, None, &settings())
            .unwrap();
    assert_eq!(report.total_sessions, 1);
    assert_eq!(report.successful_sessions, 1);

    let session = &report.sessions[0];
    assert_eq!(session.session_id, "42");
    assert_eq!(session.final_status, FinalStatus::Streaming);
    assert_eq!(session.setup_duration_sec, Some(8.0));
    assert_eq!(session.session_duration_sec, Some(600.0));
    let labels: Vec<&str> = session.timeline.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Negotiating", "Video: streaming", "Session Stopped"]);
}

#[test]
fn sessions_filtered_out_by_start_bound() {
    let report = pipeline::analyze_sessions(
        &sample_tar(),
        "unit.tar",
        Some("2025-09-24"),
        None,
        &settings(),
    )
    .unwrap();
    assert_eq!(report.total_sessions, 0);
    assert_eq!(report.avg_setup_time, None);
}

#[test]
fn sessions_keep_everything_on_unparseable_bound() {
    let report = pipeline::analyze_sessions(
        &sample_tar(),
        "unit.tar",
        Some("next tuesday"),
        None,
        &settings(),
    )
    .unwrap();
    assert_eq!(report.total_sessions, 1);
}

#[test]
fn content_analysis_shares_one_extraction() {
    let scratch = TempDir::new().unwrap();
    let settings = Settings {
        scratch_dir: Some(scratch.path().to_path_buf()),
        ..Settings::default()
    };
    let report =
        pipeline::analyze_content(&sample_tar_bz2(), "unit.tar.bz2", None, None, &settings)
            .unwrap();
    assert_eq!(report.telemetry.metrics_count, 2);
    assert_eq!(report.sessions.total_sessions, 1);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
