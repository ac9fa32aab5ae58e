//! Job processing against external collaborators.
//!
//! A [`Worker`] takes one [`Job`], fetches the named archive from an
//! [`ObjectSource`], extracts its telemetry and writes the records to a
//! [`TelemetryStore`], reporting each status change to a [`StatusSink`].

mod job;
mod store;

pub use job::{Job, JobRange, JobStatus};
pub use store::{DirObjectSource, JsonlStore, LogStatusSink, MemoryStore};

use tracing::info;

use crate::error::Result;
use crate::pipeline::{self, Settings};
use crate::telemetry::TelemetryRecord;

/// Where archive bytes come from.
pub trait ObjectSource {
    fn fetch(&self, object_name: &str) -> Result<Vec<u8>>;
}

/// Where telemetry records go.
///
/// Inserting is idempotent on `(timestamp, modem_id, session_id)`; the
/// return value counts rows actually added.
pub trait TelemetryStore {
    fn insert(&mut self, session_id: &str, records: &[TelemetryRecord]) -> Result<usize>;
}

/// Receives job status changes.
pub trait StatusSink {
    fn update(&mut self, session_id: &str, status: &JobStatus);
}

/// Processes jobs one at a time.
pub struct Worker<O, T, S> {
    objects: O,
    store: T,
    sink: S,
    settings: Settings,
}

impl<O: ObjectSource, T: TelemetryStore, S: StatusSink> Worker<O, T, S> {
    pub fn new(objects: O, store: T, sink: S, settings: Settings) -> Self {
        Self {
            objects,
            store,
            sink,
            settings,
        }
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run `job` to completion. On failure the job is marked failed and the
    /// error is returned.
    pub fn process(&mut self, job: &Job) -> Result<usize> {
        info!(session_id = %job.session_id, object = %job.object_name, "processing job");
        self.sink.update(&job.session_id, &JobStatus::Processing);

        match self.run(job) {
            Ok(metrics_count) => {
                self.sink
                    .update(&job.session_id, &JobStatus::Completed { metrics_count });
                Ok(metrics_count)
            }
            Err(e) => {
                self.sink.update(
                    &job.session_id,
                    &JobStatus::Failed {
                        error_message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    fn run(&mut self, job: &Job) -> Result<usize> {
        let bytes = self.objects.fetch(&job.object_name)?;
        let records = pipeline::extract_telemetry(
            &bytes,
            &job.filename,
            job.time_range.start.as_deref(),
            job.time_range.end.as_deref(),
            &self.settings,
        )?;
        if !records.is_empty() {
            self.store.insert(&job.session_id, &records)?;
        }
        Ok(records.len())
    }
}
