//! Queued job descriptions and their status.

use serde::{Deserialize, Serialize};

/// Optional bounds attached to a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// One unit of work: parse the named object and store its telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub session_id: String,
    pub object_name: String,
    /// Declared filename; selects the archive format.
    pub filename: String,
    #[serde(default)]
    pub time_range: JobRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

impl Job {
    /// Parse a job from its JSON queue payload.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Lifecycle of a job as reported to the status sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed { metrics_count: usize },
    Failed { error_message: String },
}

impl JobStatus {
    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }
}
