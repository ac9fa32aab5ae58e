//! Archive-to-artifact entry points.
//!
//! Each function takes the raw archive bytes and the declared filename,
//! extracts into a scratch directory that lives for the duration of the call,
//! and hands the tree to the relevant engine. [`Outcome`] wraps any result in
//! the `{success, error?, ...}` envelope the command line prints.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::archive::{read_members, Extraction, Extractor, Member};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::merge::{MergeEngine, MergeReport};
use crate::range::TimeRange;
use crate::rotation;
use crate::session::{filter_sessions, SessionAnalyzer, SessionReport};
use crate::telemetry::{self, TelemetryExtractor, TelemetryRecord, TelemetrySummary};

/// Knobs shared by every entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base name of the rotated log family to merge.
    pub log_name: String,
    /// Parent for scratch directories; system temp when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Scan members on the rayon pool.
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            log_name: config.merge.log_name.clone(),
            scratch_dir: config.scratch_dir(),
            parallel: config.scan.parallel,
        }
    }

    fn extractor(&self) -> Extractor {
        match &self.scratch_dir {
            Some(dir) => Extractor::with_scratch_root(dir),
            None => Extractor::new(),
        }
    }

    fn unpack(&self, bytes: &[u8], filename: &str) -> Result<(Extraction, Vec<Member>)> {
        let extraction = self.extractor().extract(bytes, filename)?;
        let members = read_members(extraction.root())?;
        Ok((extraction, members))
    }
}

/// Telemetry records with their count and analytics.
///
/// `metrics_count` and `analytics` always cover every record, even when
/// `metrics` itself has been downsampled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub metrics_count: usize,
    pub metrics: Vec<TelemetryRecord>,
    pub analytics: TelemetrySummary,
}

impl TelemetryReport {
    /// Build the report, thinning `metrics` with [`telemetry::downsample`]
    /// when `downsample` is set.
    pub fn new(records: Vec<TelemetryRecord>, downsample: bool) -> Self {
        let analytics = TelemetrySummary::from_records(&records);
        let metrics_count = records.len();
        let metrics = if downsample {
            telemetry::downsample(&records)
        } else {
            records
        };
        Self {
            metrics_count,
            metrics,
            analytics,
        }
    }
}

impl From<Vec<TelemetryRecord>> for TelemetryReport {
    fn from(metrics: Vec<TelemetryRecord>) -> Self {
        Self::new(metrics, false)
    }
}

/// Telemetry and sessions from one extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentReport {
    pub telemetry: TelemetryReport,
    pub sessions: SessionReport,
}

/// Merge the rotated log family inside an archive.
pub fn merge_archive(
    bytes: &[u8],
    filename: &str,
    start: Option<&str>,
    end: Option<&str>,
    settings: &Settings,
) -> Result<MergeReport> {
    let range = TimeRange::parse(start, end);
    let extraction = settings.extractor().extract(bytes, filename)?;
    let sources = rotation::resolve(extraction.root(), &settings.log_name)?;
    MergeEngine::new(settings.log_name.as_str()).merge(&sources, &range)
}

/// Modem statistics found anywhere in an archive.
pub fn extract_telemetry(
    bytes: &[u8],
    filename: &str,
    start: Option<&str>,
    end: Option<&str>,
    settings: &Settings,
) -> Result<Vec<TelemetryRecord>> {
    let range = TimeRange::parse(start, end);
    let (_extraction, members) = settings.unpack(bytes, filename)?;
    let records = TelemetryExtractor::new(settings.parallel).extract(&members);
    Ok(telemetry::filter(records, &range))
}

/// Session timelines found anywhere in an archive.
pub fn analyze_sessions(
    bytes: &[u8],
    filename: &str,
    start: Option<&str>,
    end: Option<&str>,
    settings: &Settings,
) -> Result<SessionReport> {
    let (_extraction, members) = settings.unpack(bytes, filename)?;
    let sessions = SessionAnalyzer::new(settings.parallel).analyze(&members);
    Ok(SessionReport::from_sessions(filter_sessions(
        sessions, start, end,
    )))
}

/// Telemetry and sessions over a single extraction.
pub fn analyze_content(
    bytes: &[u8],
    filename: &str,
    start: Option<&str>,
    end: Option<&str>,
    settings: &Settings,
) -> Result<ContentReport> {
    let range = TimeRange::parse(start, end);
    let (_extraction, members) = settings.unpack(bytes, filename)?;

    let records = TelemetryExtractor::new(settings.parallel).extract(&members);
    let sessions = SessionAnalyzer::new(settings.parallel).analyze(&members);
    let report = ContentReport {
        telemetry: telemetry::filter(records, &range).into(),
        sessions: SessionReport::from_sessions(filter_sessions(sessions, start, end)),
    };
    info!(
        members = members.len(),
        metrics = report.telemetry.metrics_count,
        sessions = report.sessions.total_sessions,
        "content analyzed"
    );
    Ok(report)
}

/// Result envelope: `{"success": true, ...data}` or
/// `{"success": false, "error": "...", "error_kind": "..."}`.
#[derive(Debug, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            error_kind: None,
            data: Some(data),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            data: None,
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => Outcome::failed(&e),
        }
    }
}
