//! Integration tests for job processing with the local collaborators

use std::fs;

use bondlog::worker::{
    DirObjectSource, Job, JobRange, JobStatus, JsonlStore, LogStatusSink, StatusSink, Worker,
};
use bondlog::Settings;
use tempfile::TempDir;

use crate::helpers::{sample_tar_bz2, write_file};

#[derive(Default)]
struct Collect(Vec<JobStatus>);

impl StatusSink for Collect {
    fn update(&mut self, _session_id: &str, status: &JobStatus) {
        self.0.push(status.clone());
    }
}

fn job(range: JobRange) -> Job {
    Job {
        session_id: "upload-1".to_string(),
        object_name: "uploads/unit.tar.bz2".to_string(),
        filename: "unit.tar.bz2".to_string(),
        time_range: range,
        ticket_id: Some("T-100".to_string()),
    }
}

#[test]
fn job_writes_records_once() {
    let temp = TempDir::new().unwrap();
    let objects = temp.path().join("objects");
    write_file(&objects, "uploads/unit.tar.bz2", &sample_tar_bz2());
    let store_path = temp.path().join("store.jsonl");

    let mut worker = Worker::new(
        DirObjectSource::new(&objects),
        JsonlStore::open(&store_path).unwrap(),
        Collect::default(),
        Settings::default(),
    );
    assert_eq!(worker.process(&job(JobRange::default())).unwrap(), 2);
    assert_eq!(
        worker.sink().0,
        vec![JobStatus::Processing, JobStatus::Completed { metrics_count: 2 }]
    );

    // a fresh worker over the same store adds nothing
    let mut again = Worker::new(
        DirObjectSource::new(&objects),
        JsonlStore::open(&store_path).unwrap(),
        LogStatusSink,
        Settings::default(),
    );
    assert_eq!(again.process(&job(JobRange::default())).unwrap(), 2);
    assert_eq!(again.store().len(), 2);
    assert_eq!(fs::read_to_string(&store_path).unwrap().lines().count(), 2);
}

#[test]
fn job_time_range_limits_records() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "uploads/unit.tar.bz2", &sample_tar_bz2());
    let mut worker = Worker::new(
        DirObjectSource::new(temp.path()),
        bondlog::worker::MemoryStore::new(),
        Collect::default(),
        Settings::default(),
    );
    let range = JobRange {
        start: Some("2025-09-24".to_string()),
        end: None,
    };
    assert_eq!(worker.process(&job(range)).unwrap(), 1);
    assert_eq!(worker.store().rows()[0].1.modem_id, 2);
    assert_eq!(worker.store().rows()[0].0, "upload-1");
}

#[test]
fn unsupported_object_marks_job_failed() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "uploads/unit.tar.bz2", b"irrelevant");
    let mut worker = Worker::new(
        DirObjectSource::new(temp.path()),
        bondlog::worker::MemoryStore::new(),
        Collect::default(),
        Settings::default(),
    );
    let mut bad = job(JobRange::default());
    bad.filename = "unit.zip".to_string();

    assert!(worker.process(&bad).is_err());
    match worker.sink().0.last() {
        Some(JobStatus::Failed { error_message }) => {
            assert!(error_message.contains("Unsupported archive format"))
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert!(worker.store().rows().is_empty());
}
