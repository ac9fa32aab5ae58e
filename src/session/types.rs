//! Session records and timeline events.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Category of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// State machine entered a new state.
    Transition,
    /// Video readiness changed.
    Readiness,
    /// Free-text status message.
    Status,
    /// Stop or disconnect signal.
    End,
}

/// Last known status of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FinalStatus {
    #[default]
    Unknown,
    Collecting,
    Streaming,
    /// Any other readiness token, kept verbatim.
    Other(String),
}

impl FinalStatus {
    pub fn from_token(token: &str) -> Self {
        match token {
            "streaming" => FinalStatus::Streaming,
            "collecting" => FinalStatus::Collecting,
            other => FinalStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FinalStatus::Unknown => "unknown",
            FinalStatus::Collecting => "collecting",
            FinalStatus::Streaming => "streaming",
            FinalStatus::Other(token) => token,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, FinalStatus::Streaming)
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FinalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry in a session timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    pub timestamp: NaiveDateTime,
    pub label: String,
    pub kind: EventKind,
    /// Seconds until the next event; absent on the last one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_to_next_sec: Option<f64>,
}

/// Network endpoints a session used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub collector_address: Option<String>,
    pub ifb_address: Option<String>,
    pub stun_server: Option<String>,
    pub video_port: Option<String>,
    pub audio_ports: Vec<String>,
}

/// Streaming parameters a session used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamingConfig {
    pub profile: Option<String>,
    pub spare_delay: Option<String>,
    pub active_links: Option<String>,
    pub encryption: Option<bool>,
}

/// Everything reconstructed for one session id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub unit_name: Option<String>,
    pub server_instance: Option<String>,
    pub server_version: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub session_duration_sec: Option<f64>,
    pub setup_duration_sec: Option<f64>,
    pub final_status: FinalStatus,
    pub network_config: NetworkConfig,
    pub streaming_config: StreamingConfig,
    pub timeline: Vec<SessionEvent>,
}
