//! Local collaborator implementations.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::job::JobStatus;
use super::{ObjectSource, StatusSink, TelemetryStore};
use crate::error::{Error, Result};
use crate::telemetry::TelemetryRecord;

/// Uniqueness key of a stored record.
type RecordKey = (NaiveDateTime, u32, String);

fn key_of(session_id: &str, record: &TelemetryRecord) -> RecordKey {
    (record.timestamp, record.modem_id, session_id.to_string())
}

/// Reads objects from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirObjectSource {
    root: PathBuf,
}

impl DirObjectSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectSource for DirObjectSource {
    fn fetch(&self, object_name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(object_name);
        if !path.starts_with(&self.root) || object_name.split('/').any(|part| part == "..") {
            return Err(Error::NotFound {
                what: format!("object {}", object_name),
            });
        }
        debug!(path = %path.display(), "fetching object");
        fs::read(&path).map_err(|e| Error::io(path, e))
    }
}

/// In-process store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: HashSet<RecordKey>,
    rows: Vec<(String, TelemetryRecord)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[(String, TelemetryRecord)] {
        &self.rows
    }
}

impl TelemetryStore for MemoryStore {
    fn insert(&mut self, session_id: &str, records: &[TelemetryRecord]) -> Result<usize> {
        let mut inserted = 0;
        for record in records {
            if self.keys.insert(key_of(session_id, record)) {
                self.rows.push((session_id.to_string(), record.clone()));
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[derive(Serialize)]
struct StoredRow<'a> {
    session_id: &'a str,
    #[serde(flatten)]
    record: &'a TelemetryRecord,
}

#[derive(Deserialize)]
struct StoredKey {
    session_id: String,
    timestamp: NaiveDateTime,
    modem_id: u32,
}

/// Append-only JSON lines file, one record per line.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    keys: HashSet<RecordKey>,
}

impl JsonlStore {
    /// Open (or create) the store, loading keys already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut keys = HashSet::new();
        if path.exists() {
            let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
            for (number, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| Error::io(&path, e))?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StoredKey>(&line) {
                    Ok(row) => {
                        keys.insert((row.timestamp, row.modem_id, row.session_id));
                    }
                    Err(e) => warn!(line = number + 1, error = %e, "skipping unreadable store row"),
                }
            }
        }
        debug!(path = %path.display(), rows = keys.len(), "telemetry store opened");
        Ok(Self { path, keys })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl TelemetryStore for JsonlStore {
    fn insert(&mut self, session_id: &str, records: &[TelemetryRecord]) -> Result<usize> {
        let mut buffer = String::new();
        let mut fresh: HashSet<RecordKey> = HashSet::new();
        for record in records {
            let key = key_of(session_id, record);
            if self.keys.contains(&key) || !fresh.insert(key) {
                continue;
            }
            let row = serde_json::to_string(&StoredRow { session_id, record })
                .map_err(|e| Error::Processing(format!("cannot encode telemetry row: {}", e)))?;
            buffer.push_str(&row);
            buffer.push('\n');
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        file.write_all(buffer.as_bytes())
            .map_err(|e| Error::io(&self.path, e))?;

        let inserted = fresh.len();
        self.keys.extend(fresh);
        info!(session_id, inserted, "telemetry stored");
        Ok(inserted)
    }
}

/// Reports job status through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn update(&mut self, session_id: &str, status: &JobStatus) {
        match status {
            JobStatus::Failed { error_message } => {
                warn!(session_id, status = status.name(), error = %error_message, "job status")
            }
            JobStatus::Completed { metrics_count } => {
                info!(session_id, status = status.name(), metrics_count, "job status")
            }
            _ => info!(session_id, status = status.name(), "job status"),
        }
    }
}
