//! Caller-supplied date bounds.
//!
//! Bounds arrive as optional strings in one of three granularities:
//! `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS` (a `T` is
//! accepted in place of the space). A date-only end bound covers the whole
//! day, up to 23:59:59. An unparseable bound is logged and not applied.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::warn;

use crate::timestamp::{format_stamp, Stamp};

/// Which side of a range a bound sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse a single bound.
///
/// Returns `None` when the text matches none of the accepted layouts.
pub fn parse_bound(text: &str, bound: Bound) -> Option<NaiveDateTime> {
    let text = text.trim();
    let normalized = text.replacen('T', " ", 1);
    let parts: Vec<&str> = normalized.split_whitespace().collect();

    match parts.as_slice() {
        [date] => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let time = match bound {
                Bound::Start => NaiveTime::MIN,
                Bound::End => NaiveTime::from_hms_opt(23, 59, 59)?,
            };
            Some(date.and_time(time))
        }
        [date, time] => {
            let joined = format!("{} {}", date, time);
            match time.matches(':').count() {
                1 => NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M").ok(),
                _ => NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S").ok(),
            }
        }
        _ => None,
    }
}

/// Inclusive `[start, end]` window; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Build a range from optional caller strings.
    ///
    /// Empty strings count as absent. A bound that fails to parse is
    /// warned about and left open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        let read = |text: Option<&str>, bound: Bound| {
            let text = text.map(str::trim).filter(|t| !t.is_empty())?;
            let parsed = parse_bound(text, bound);
            if parsed.is_none() {
                warn!(?bound, value = text, "ignoring unparseable date bound");
            }
            parsed
        };
        Self {
            start: read(start, Bound::Start),
            end: read(end, Bound::End),
        }
    }

    /// Whether any bound is set.
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Inclusive containment check on a wall-clock instant.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return false;
            }
        }
        true
    }

    /// Containment for a stamp. Invalid stamps are never inside a range.
    pub fn admits(&self, stamp: &Stamp) -> bool {
        stamp.get().map(|at| self.contains(at)).unwrap_or(false)
    }

    /// Serializable view of the effective bounds.
    pub fn applied(&self) -> AppliedFilter {
        AppliedFilter {
            start_datetime: self.start.map(format_stamp),
            end_datetime: self.end.map(format_stamp),
        }
    }
}

/// Effective filter bounds as reported in metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedFilter {
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}
