//! Modem statistics extraction.
//!
//! Bonded-modem units periodically log one line per modem with its
//! potential bandwidth, loss and delay figures. A line yields a
//! [`TelemetryRecord`] only when every field is present on that line, in
//! order; partial matches produce nothing and nothing carries over between
//! lines.
//!
//! ```text
//! 2025-09-23T12:23:36.779174+00:00 ... Modem Statistics for modem 2: ...
//!   potentialBW 1500kbps ... loss (0.5%) ...
//!   extrapolated smooth upstream delay (45ms) ...
//!   shortest round trip delay (80ms) ...
//!   extrapolated smooth round trip delay (95ms) ...
//!   minimum smooth round trip delay (78ms)
//! ```

pub mod summary;
mod units;

pub use summary::{downsample, TelemetrySummary};
pub use units::to_mbps;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, info};

use crate::archive::Member;
use crate::range::TimeRange;
use crate::timestamp;

static MODEM_STATS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+[+-]\d{2}:\d{2})",
        r".*?Modem Statistics for modem (?P<modem>\d+):",
        r".*?potentialBW (?P<bw>\d+(?:\.\d+)?)(?P<unit>[A-Za-z]*bps)",
        r".*?loss \((?P<loss>\d+(?:\.\d+)?)%\)",
        r".*?extrapolated smooth upstream delay \((?P<upstream>\d+)ms\)",
        r".*?shortest round trip delay \((?P<shortest>\d+)ms\)",
        r".*?extrapolated smooth round trip delay \((?P<smooth>\d+)ms\)",
        r".*?minimum smooth round trip delay \((?P<min>\d+)ms\)",
    ))
    .expect("modem statistics pattern is valid")
});

/// One normalized per-modem sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Wall-clock time; the logged offset is discarded.
    pub timestamp: NaiveDateTime,
    pub modem_id: u32,
    /// Always Mbps, whatever unit the log used.
    pub bandwidth_mbps: f64,
    pub packet_loss_percent: f64,
    pub upstream_delay_ms: i64,
    pub shortest_rtt_ms: i64,
    pub smooth_rtt_ms: i64,
    pub min_rtt_ms: i64,
}

/// Parse one line into a record.
pub fn parse_line(line: &str) -> Option<TelemetryRecord> {
    let caps = MODEM_STATS.captures(line)?;
    let record = from_captures(&caps);
    if record.is_none() {
        debug!(line, "modem statistics line has out-of-range numbers");
    }
    record
}

fn from_captures(caps: &Captures<'_>) -> Option<TelemetryRecord> {
    let timestamp = timestamp::search(&caps["ts"]).get()?;
    let bandwidth: f64 = caps["bw"].parse().ok()?;
    Some(TelemetryRecord {
        timestamp,
        modem_id: caps["modem"].parse().ok()?,
        bandwidth_mbps: to_mbps(bandwidth, &caps["unit"]),
        packet_loss_percent: caps["loss"].parse().ok()?,
        upstream_delay_ms: caps["upstream"].parse().ok()?,
        shortest_rtt_ms: caps["shortest"].parse().ok()?,
        smooth_rtt_ms: caps["smooth"].parse().ok()?,
        min_rtt_ms: caps["min"].parse().ok()?,
    })
}

/// Scan a block of text, in line order.
pub fn scan(content: &str) -> Vec<TelemetryRecord> {
    content.lines().filter_map(parse_line).collect()
}

/// Keep records inside `range`, inclusive at both ends.
pub fn filter(records: Vec<TelemetryRecord>, range: &TimeRange) -> Vec<TelemetryRecord> {
    if !range.is_active() {
        return records;
    }
    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|r| range.contains(r.timestamp))
        .collect();
    info!(before, after = kept.len(), "time range filtering applied");
    kept
}

/// Extracts telemetry from decoded archive members.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryExtractor {
    parallel: bool,
}

impl TelemetryExtractor {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Records from all members, members in order, lines in file order.
    ///
    /// The parallel path scans members on the rayon pool and concatenates
    /// the per-member results in member order, so both paths agree.
    pub fn extract(&self, members: &[Member]) -> Vec<TelemetryRecord> {
        let per_member: Vec<Vec<TelemetryRecord>> = if self.parallel {
            members.par_iter().map(|m| scan(&m.content)).collect()
        } else {
            members.iter().map(|m| scan(&m.content)).collect()
        };
        let records: Vec<_> = per_member.into_iter().flatten().collect();
        info!(members = members.len(), records = records.len(), "telemetry extracted");
        records
    }
}
