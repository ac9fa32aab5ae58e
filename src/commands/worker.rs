//! Worker command handler

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use bondlog::worker::{DirObjectSource, Job, JobStatus, JsonlStore, LogStatusSink, Worker};
use bondlog::{Config, Settings};

use super::to_json;

#[derive(Serialize)]
struct JobReport<'a> {
    session_id: &'a str,
    #[serde(flatten)]
    status: JobStatus,
}

/// Run one job description against the local objects directory and store.
///
/// Flags override `[worker]` settings from the config file.
#[cfg(not(tarpaulin_include))]
pub fn handle(job_path: &Path, objects: Option<PathBuf>, store: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let text = fs::read_to_string(job_path)
        .with_context(|| format!("Failed to read job file: {}", job_path.display()))?;
    let job = Job::from_json(&text)
        .with_context(|| format!("Failed to parse job file: {}", job_path.display()))?;

    let objects = objects.unwrap_or_else(|| config.objects_dir());
    let store_path = store.unwrap_or_else(|| config.store_path());
    let store = JsonlStore::open(&store_path)?;

    let mut worker = Worker::new(
        DirObjectSource::new(objects),
        store,
        LogStatusSink,
        Settings::from_config(&config),
    );

    let status = match worker.process(&job) {
        Ok(metrics_count) => JobStatus::Completed { metrics_count },
        Err(e) => JobStatus::Failed {
            error_message: e.to_string(),
        },
    };
    println!(
        "{}",
        to_json(&JobReport {
            session_id: &job.session_id,
            status: status.clone(),
        })?
    );
    match status {
        JobStatus::Failed { error_message } => Err(anyhow::anyhow!(error_message)),
        _ => Ok(()),
    }
}
