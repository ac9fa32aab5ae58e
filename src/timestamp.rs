//! Per-line timestamp normalization.
//!
//! Diagnostic archives mix several timestamp styles, sometimes within the
//! same file. [`TimestampParser`] tries an ordered, most-specific-first list
//! of anchored patterns and returns a [`Stamp`]. Numeric offsets are parsed
//! and then dropped, so every stamp is a wall-clock value and comparisons
//! across lines with different offsets are naive.
//!
//! # Supported forms
//!
//! ```text
//! 2025-09-23T12:23:36.779174+00:00   ISO-8601, fraction + offset
//! 2025-09-23T12:23:36+00:00          ISO-8601, offset
//! 2025-09-23T12:23:36.779174         ISO-8601, fraction
//! 2024-01-15T10:30:45                ISO-8601
//! 2024-01-15 10:30:45                date, whitespace, time
//! Jan 15 10:30:45                    syslog (year supplied by the parser)
//! ```

use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::trace;

/// Canonical rendering used for serialized stamps.
const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A parsed wall-clock instant, or the explicit invalid value.
///
/// The invalid stamp orders before every valid one, so lines without a
/// recognizable timestamp collate to the earliest position when sorted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(Option<NaiveDateTime>);

impl Stamp {
    /// The "no timestamp found" value.
    pub const INVALID: Stamp = Stamp(None);

    pub fn new(at: NaiveDateTime) -> Self {
        Stamp(Some(at))
    }

    /// Whether a timestamp was actually recognized.
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<NaiveDateTime> {
        self.0
    }

    /// Seconds from `self` to `later`, if both are valid and the span fits.
    pub fn seconds_until(&self, later: &Stamp) -> Option<f64> {
        let (from, to) = (self.0?, later.0?);
        let micros = to.signed_duration_since(from).num_microseconds()?;
        Some(micros as f64 / 1_000_000.0)
    }
}

impl From<NaiveDateTime> for Stamp {
    fn from(at: NaiveDateTime) -> Self {
        Stamp::new(at)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(at) => write!(f, "{}", format_stamp(at)),
            None => write!(f, "-"),
        }
    }
}

impl Serialize for Stamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(at) => serializer.serialize_str(&format_stamp(at)),
            None => serializer.serialize_none(),
        }
    }
}

/// Render a wall-clock instant as `YYYY-MM-DDTHH:MM:SS[.fraction]`.
pub fn format_stamp(at: NaiveDateTime) -> String {
    at.format(STAMP_FORMAT).to_string()
}

/// How a matched token is turned into a `NaiveDateTime`.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Carries a numeric offset that is parsed and then discarded.
    WithOffset(&'static str),
    Naive(&'static str),
    /// No year in the text.
    Syslog,
}

struct Pattern {
    regex: Regex,
    shape: Shape,
}

fn pattern(re: &str, shape: Shape) -> Pattern {
    Pattern {
        regex: Regex::new(re).expect("timestamp pattern is valid"),
        shape,
    }
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        pattern(
            r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+[+-]\d{2}:\d{2})",
            Shape::WithOffset("%Y-%m-%dT%H:%M:%S%.f%:z"),
        ),
        pattern(
            r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{2}:\d{2})",
            Shape::WithOffset("%Y-%m-%dT%H:%M:%S%:z"),
        ),
        pattern(
            r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+)",
            Shape::Naive("%Y-%m-%dT%H:%M:%S%.f"),
        ),
        pattern(
            r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})",
            Shape::Naive("%Y-%m-%dT%H:%M:%S"),
        ),
        pattern(
            r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})",
            Shape::Naive("%Y-%m-%d %H:%M:%S"),
        ),
        pattern(r"^([A-Za-z]{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})", Shape::Syslog),
    ]
});

/// First ISO-8601 timestamp anywhere in a line; offset and `Z` are optional.
static ISO_ANYWHERE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?)(?:[+-]\d{2}:\d{2}|Z)?",
    )
    .expect("iso pattern is valid")
});

/// Collapse whitespace runs so chrono sees single separators.
fn squeeze_whitespace(token: &str) -> String {
    token.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Line timestamp parser.
///
/// Holds the year substituted into syslog-style stamps, which carry none.
#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    year: i32,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampParser {
    /// Parser using the current local year for syslog stamps.
    pub fn new() -> Self {
        Self {
            year: Local::now().year(),
        }
    }

    /// Parser with a pinned syslog year.
    pub fn with_year(year: i32) -> Self {
        Self { year }
    }

    /// Parse the timestamp at the start of `line`.
    ///
    /// Returns [`Stamp::INVALID`] when no pattern matches. A token that
    /// matches a pattern textually but is not a real calendar value falls
    /// through to the next pattern.
    pub fn parse_line(&self, line: &str) -> Stamp {
        let trimmed = line.trim();
        for p in PATTERNS.iter() {
            let Some(caps) = p.regex.captures(trimmed) else {
                continue;
            };
            let token = &caps[1];
            if let Some(at) = self.convert(token, p.shape) {
                return Stamp::new(at);
            }
        }
        trace!(line = %truncate(trimmed, 80), "no timestamp recognized");
        Stamp::INVALID
    }

    fn convert(&self, token: &str, shape: Shape) -> Option<NaiveDateTime> {
        match shape {
            Shape::WithOffset(fmt) => DateTime::parse_from_str(token, fmt)
                .ok()
                .map(|dt| dt.naive_local()),
            Shape::Naive(fmt) => {
                NaiveDateTime::parse_from_str(&squeeze_whitespace(token), fmt).ok()
            }
            Shape::Syslog => {
                let with_year = format!("{} {}", self.year, squeeze_whitespace(token));
                NaiveDateTime::parse_from_str(&with_year, "%Y %b %d %H:%M:%S").ok()
            }
        }
    }
}

/// Find the first ISO-8601 timestamp anywhere in `line`.
///
/// Any offset or trailing `Z` is discarded.
pub fn search(line: &str) -> Stamp {
    ISO_ANYWHERE
        .captures(line)
        .and_then(|caps| NaiveDateTime::parse_from_str(&caps[1], STAMP_FORMAT).ok())
        .map(Stamp::new)
        .unwrap_or(Stamp::INVALID)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
