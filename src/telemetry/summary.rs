//! Analytics over a set of telemetry records.
//!
//! Overall and per-modem bandwidth, loss and smooth-RTT figures, plus a few
//! quality counters. Large record sets can be thinned with [`downsample`]
//! before they are charted; the summary itself is always computed over the
//! full set.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::TelemetryRecord;

/// Record count above which [`downsample`] thins the set.
pub const DOWNSAMPLE_THRESHOLD: usize = 10_000;
/// Approximate number of records [`downsample`] keeps.
pub const DOWNSAMPLE_TARGET: usize = 5_000;

/// Loss above this percentage counts as a high-loss sample.
pub const HIGH_LOSS_PERCENT: f64 = 5.0;
/// Smooth RTT above this counts as a high-latency sample.
pub const HIGH_LATENCY_MS: i64 = 200;
/// Bandwidth below this counts as a low-bandwidth sample.
pub const LOW_BANDWIDTH_MBPS: f64 = 0.5;

/// Running min/max/sum for one set of records.
#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    bandwidth_sum: f64,
    bandwidth_min: Option<f64>,
    bandwidth_max: Option<f64>,
    loss_sum: f64,
    loss_max: Option<f64>,
    rtt_sum: i64,
    rtt_min: Option<i64>,
    rtt_max: Option<i64>,
}

impl Accumulator {
    fn add(&mut self, record: &TelemetryRecord) {
        self.count += 1;
        self.bandwidth_sum += record.bandwidth_mbps;
        self.bandwidth_min = Some(lower(self.bandwidth_min, record.bandwidth_mbps));
        self.bandwidth_max = Some(higher(self.bandwidth_max, record.bandwidth_mbps));
        self.loss_sum += record.packet_loss_percent;
        self.loss_max = Some(higher(self.loss_max, record.packet_loss_percent));
        self.rtt_sum = self.rtt_sum.saturating_add(record.smooth_rtt_ms);
        self.rtt_min = Some(lower(self.rtt_min, record.smooth_rtt_ms));
        self.rtt_max = Some(higher(self.rtt_max, record.smooth_rtt_ms));
    }

    fn mean(&self, sum: f64) -> Option<f64> {
        (self.count > 0).then(|| sum / self.count as f64)
    }
}

fn lower<T: PartialOrd>(current: Option<T>, value: T) -> T {
    match current {
        Some(c) if c <= value => c,
        _ => value,
    }
}

fn higher<T: PartialOrd>(current: Option<T>, value: T) -> T {
    match current {
        Some(c) if c >= value => c,
        _ => value,
    }
}

/// Figures across every modem.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallStatistics {
    pub modem_count: usize,
    pub total_measurements: usize,
    pub avg_bandwidth: Option<f64>,
    pub max_bandwidth: Option<f64>,
    pub min_bandwidth: Option<f64>,
    pub total_bandwidth: f64,
    pub avg_packet_loss: Option<f64>,
    pub max_packet_loss: Option<f64>,
    /// Smooth round trip, as are the other rtt figures.
    pub avg_rtt: Option<f64>,
    pub min_rtt: Option<i64>,
    pub max_rtt: Option<i64>,
    pub session_start: Option<NaiveDateTime>,
    pub session_end: Option<NaiveDateTime>,
    pub session_duration_seconds: Option<f64>,
}

/// Figures for one modem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModemStatistics {
    pub modem_id: u32,
    pub measurement_count: usize,
    pub avg_bandwidth: Option<f64>,
    pub max_bandwidth: Option<f64>,
    pub min_bandwidth: Option<f64>,
    pub avg_packet_loss: Option<f64>,
    pub max_packet_loss: Option<f64>,
    pub avg_rtt: Option<f64>,
    pub min_rtt: Option<i64>,
    pub max_rtt: Option<i64>,
}

/// Counters of degraded samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityInsights {
    pub high_loss_samples: usize,
    pub high_latency_samples: usize,
    pub low_bandwidth_samples: usize,
    /// Mean bandwidth over samples with exactly zero loss.
    pub avg_bandwidth_no_loss: Option<f64>,
    pub total_samples: usize,
    /// `100 - high_loss_samples / total_samples * 100`; 100 for an empty set.
    pub reliability_score: f64,
}

/// Overall, per-modem and quality analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySummary {
    pub overall_statistics: OverallStatistics,
    /// Ordered by modem id.
    pub per_modem_statistics: Vec<ModemStatistics>,
    pub quality_insights: QualityInsights,
}

impl TelemetrySummary {
    pub fn from_records(records: &[TelemetryRecord]) -> Self {
        let mut overall = Accumulator::default();
        let mut per_modem: BTreeMap<u32, Accumulator> = BTreeMap::new();
        let mut start: Option<NaiveDateTime> = None;
        let mut end: Option<NaiveDateTime> = None;

        let mut high_loss = 0;
        let mut high_latency = 0;
        let mut low_bandwidth = 0;
        let mut no_loss_sum = 0.0;
        let mut no_loss_count = 0usize;

        for record in records {
            overall.add(record);
            per_modem.entry(record.modem_id).or_default().add(record);
            start = Some(start.map_or(record.timestamp, |s| s.min(record.timestamp)));
            end = Some(end.map_or(record.timestamp, |e| e.max(record.timestamp)));

            if record.packet_loss_percent > HIGH_LOSS_PERCENT {
                high_loss += 1;
            }
            if record.smooth_rtt_ms > HIGH_LATENCY_MS {
                high_latency += 1;
            }
            if record.bandwidth_mbps < LOW_BANDWIDTH_MBPS {
                low_bandwidth += 1;
            }
            if record.packet_loss_percent == 0.0 {
                no_loss_sum += record.bandwidth_mbps;
                no_loss_count += 1;
            }
        }

        let duration = match (start, end) {
            (Some(s), Some(e)) => e
                .signed_duration_since(s)
                .num_microseconds()
                .map(|us| us as f64 / 1_000_000.0),
            _ => None,
        };

        let overall_statistics = OverallStatistics {
            modem_count: per_modem.len(),
            total_measurements: overall.count,
            avg_bandwidth: overall.mean(overall.bandwidth_sum),
            max_bandwidth: overall.bandwidth_max,
            min_bandwidth: overall.bandwidth_min,
            total_bandwidth: overall.bandwidth_sum,
            avg_packet_loss: overall.mean(overall.loss_sum),
            max_packet_loss: overall.loss_max,
            avg_rtt: overall.mean(overall.rtt_sum as f64),
            min_rtt: overall.rtt_min,
            max_rtt: overall.rtt_max,
            session_start: start,
            session_end: end,
            session_duration_seconds: duration,
        };

        let per_modem_statistics = per_modem
            .into_iter()
            .map(|(modem_id, acc)| ModemStatistics {
                modem_id,
                measurement_count: acc.count,
                avg_bandwidth: acc.mean(acc.bandwidth_sum),
                max_bandwidth: acc.bandwidth_max,
                min_bandwidth: acc.bandwidth_min,
                avg_packet_loss: acc.mean(acc.loss_sum),
                max_packet_loss: acc.loss_max,
                avg_rtt: acc.mean(acc.rtt_sum as f64),
                min_rtt: acc.rtt_min,
                max_rtt: acc.rtt_max,
            })
            .collect();

        let total = records.len();
        let quality_insights = QualityInsights {
            high_loss_samples: high_loss,
            high_latency_samples: high_latency,
            low_bandwidth_samples: low_bandwidth,
            avg_bandwidth_no_loss: (no_loss_count > 0)
                .then(|| no_loss_sum / no_loss_count as f64),
            total_samples: total,
            reliability_score: 100.0 - high_loss as f64 / total.max(1) as f64 * 100.0,
        };

        Self {
            overall_statistics,
            per_modem_statistics,
            quality_insights,
        }
    }
}

/// Thin `records` to roughly [`DOWNSAMPLE_TARGET`] entries once there are
/// more than [`DOWNSAMPLE_THRESHOLD`], keeping every n-th record from the
/// first. Order is preserved.
pub fn downsample(records: &[TelemetryRecord]) -> Vec<TelemetryRecord> {
    if records.len() <= DOWNSAMPLE_THRESHOLD {
        return records.to_vec();
    }
    let rate = (records.len() / DOWNSAMPLE_TARGET).max(1);
    records.iter().step_by(rate).cloned().collect()
}
