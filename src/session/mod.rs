//! Session timeline reconstruction.
//!
//! Lines tagged with `SESSION ID: <n>` are classified independently
//! ([`rules::classify`]) and folded into one [`SessionBuilder`] per id.
//! Finishing a builder sorts its timeline and derives the setup and
//! session durations; [`SessionReport`] adds cross-session aggregates.

mod builder;
mod filter;
pub mod rules;
mod types;

pub use builder::{SessionBuilder, SessionSet};
pub use filter::filter_sessions;
pub use rules::{classify, Field, FieldRule, LineObservation};
pub use types::{
    EventKind, FinalStatus, NetworkConfig, SessionEvent, SessionRecord, StreamingConfig,
};

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::archive::Member;

fn observations(content: &str) -> Vec<LineObservation> {
    content.lines().filter_map(classify).collect()
}

/// Reconstructs sessions from decoded archive members.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAnalyzer {
    parallel: bool,
}

impl SessionAnalyzer {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Sessions found across `members`, ordered by start time.
    pub fn analyze(&self, members: &[Member]) -> Vec<SessionRecord> {
        let per_member: Vec<Vec<LineObservation>> = if self.parallel {
            members.par_iter().map(|m| observations(&m.content)).collect()
        } else {
            members.iter().map(|m| observations(&m.content)).collect()
        };

        let mut set = SessionSet::new();
        for observation in per_member.into_iter().flatten() {
            set.apply(observation);
        }
        info!(members = members.len(), sessions = set.len(), "sessions reconstructed");
        set.finish()
    }

    /// Convenience for a single block of text.
    pub fn analyze_text(&self, content: &str) -> Vec<SessionRecord> {
        let mut set = SessionSet::new();
        for observation in observations(content) {
            set.apply(observation);
        }
        set.finish()
    }
}

/// Sessions plus aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub total_sessions: usize,
    /// Sessions whose final status is streaming.
    pub successful_sessions: usize,
    pub non_streaming_sessions: usize,
    /// Neither streaming nor collecting.
    pub failed_sessions: usize,
    pub avg_setup_time: Option<f64>,
    pub avg_session_duration: Option<f64>,
    pub sessions: Vec<SessionRecord>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

impl SessionReport {
    pub fn from_sessions(sessions: Vec<SessionRecord>) -> Self {
        let total_sessions = sessions.len();
        let successful_sessions = sessions
            .iter()
            .filter(|s| s.final_status.is_streaming())
            .count();
        let failed_sessions = sessions
            .iter()
            .filter(|s| {
                !matches!(
                    s.final_status,
                    FinalStatus::Streaming | FinalStatus::Collecting
                )
            })
            .count();
        Self {
            total_sessions,
            successful_sessions,
            non_streaming_sessions: total_sessions - successful_sessions,
            failed_sessions,
            avg_setup_time: mean(sessions.iter().filter_map(|s| s.setup_duration_sec)),
            avg_session_duration: mean(sessions.iter().filter_map(|s| s.session_duration_sec)),
            sessions,
        }
    }
}
