//! Date filtering of finished sessions.
//!
//! Bounds are taken as raw caller text. A bound that does not parse lets the
//! session through, and no later bound is checked.

use tracing::warn;

use super::types::SessionRecord;
use crate::range::{parse_bound, Bound};

fn keep(record: &SessionRecord, start: Option<&str>, end: Option<&str>) -> bool {
    let Some(started) = record.start_time else {
        return false;
    };
    if let Some(text) = start {
        match parse_bound(text, Bound::Start) {
            Some(bound) if started < bound => return false,
            Some(_) => {}
            None => {
                warn!(bound = text, "unparseable session start filter");
                return true;
            }
        }
    }
    if let Some(text) = end {
        match parse_bound(text, Bound::End) {
            Some(bound) if started > bound => return false,
            Some(_) => {}
            None => {
                warn!(bound = text, "unparseable session end filter");
                return true;
            }
        }
    }
    true
}

/// Sessions whose start time falls inside the given bounds.
///
/// With neither bound set every session is returned, including those with
/// no start time.
pub fn filter_sessions(
    sessions: Vec<SessionRecord>,
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<SessionRecord> {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = end.filter(|s| !s.trim().is_empty());
    if start.is_none() && end.is_none() {
        return sessions;
    }
    sessions
        .into_iter()
        .filter(|record| keep(record, start, end))
        .collect()
}
