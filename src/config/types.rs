//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Archive extraction settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Parent directory for scratch extraction roots; system temp when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<String>,
}

/// Merge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Base name of the rotated log family
    #[serde(default = "default_log_name")]
    pub log_name: String,
}

pub fn default_log_name() -> String {
    "messages.log".to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            log_name: default_log_name(),
        }
    }
}

/// Content scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scan archive members on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

pub fn default_parallel() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

/// Local worker collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Directory the local object source reads from
    #[serde(default = "default_objects_dir")]
    pub objects_dir: String,
    /// JSON lines file the local telemetry store appends to
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

pub fn default_objects_dir() -> String {
    "~/.local/share/bondlog/objects".to_string()
}

pub fn default_store_path() -> String {
    "~/.local/share/bondlog/telemetry.jsonl".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            objects_dir: default_objects_dir(),
            store_path: default_store_path(),
        }
    }
}
