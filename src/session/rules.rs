//! Line classification for session reconstruction.
//!
//! [`classify`] is pure: it turns one line into a [`LineObservation`]
//! without touching any session state. How an observed field lands in a
//! session is decided by [`Field::rule`], the single merge rule table.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::EventKind;
use crate::timestamp;

/// How repeated observations of a field combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Keep the first value seen.
    FirstWins,
    /// Overwrite with every new value.
    LastWins,
    /// Collect every value in order.
    Append,
}

/// Session-scoped scalar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    UnitName,
    ServerInstance,
    ServerVersion,
    CollectorAddress,
    IfbAddress,
    StunServer,
    VideoPort,
    AudioPort,
    Profile,
    SpareDelay,
    ActiveLinks,
    Encryption,
}

impl Field {
    pub const fn rule(self) -> FieldRule {
        match self {
            Field::UnitName | Field::ServerInstance | Field::ServerVersion => FieldRule::FirstWins,
            Field::AudioPort => FieldRule::Append,
            Field::CollectorAddress
            | Field::IfbAddress
            | Field::StunServer
            | Field::VideoPort
            | Field::Profile
            | Field::SpareDelay
            | Field::ActiveLinks
            | Field::Encryption => FieldRule::LastWins,
        }
    }
}

/// A timestamped event seen on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent {
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
    pub label: String,
    /// Readiness or status token carried by the event.
    pub token: Option<String>,
}

/// Everything one line says about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineObservation {
    pub session_id: String,
    pub fields: Vec<(Field, String)>,
    pub events: Vec<ObservedEvent>,
}

/// Label given to stop/disconnect events.
pub const STOPPED_LABEL: &str = "Session Stopped";

struct Patterns {
    session_id: Regex,
    fields: Vec<(Field, Regex, fn(&regex::Captures<'_>) -> String)>,
    transition: Regex,
    readiness: Regex,
    status: Regex,
    stops: Vec<Regex>,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("session pattern is valid")
}

fn first_group(caps: &regex::Captures<'_>) -> String {
    caps[1].to_string()
}

fn host_port(caps: &regex::Captures<'_>) -> String {
    format!("{}:{}", &caps[1], &caps[2])
}

fn millis(caps: &regex::Captures<'_>) -> String {
    format!("{}ms", &caps[1])
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    session_id: re(r"SESSION ID:\s*(\d+)"),
    fields: vec![
        (Field::UnitName, re(r"corecard\s+(\w+)\s+"), first_group),
        (Field::ServerInstance, re(r"(Boss\d+_\d+_Instance\d+)"), first_group),
        (
            Field::ServerVersion,
            re(r"version:\s*([\d\.]+\.[A-Za-z]\d+\.[A-Za-z]\w+)"),
            first_group,
        ),
        (
            Field::CollectorAddress,
            re(r"destination':\s*\['([^']+)',\s*(\d+)\]"),
            host_port,
        ),
        (
            Field::IfbAddress,
            re(r"ifbAddress':\s*\['([^']+)',\s*(\d+)\]"),
            host_port,
        ),
        (
            Field::StunServer,
            re(r"'host':\s*'([^']+)',.*?'port':\s*(\d+)"),
            host_port,
        ),
        (
            Field::VideoPort,
            re(r"listening to socket on port (\d+).*video"),
            first_group,
        ),
        (
            Field::AudioPort,
            re(r"listening to socket on port (\d+).*audio"),
            first_group,
        ),
        (
            Field::Profile,
            re(r"Set probing profile to (\w+) profile"),
            first_group,
        ),
        (
            Field::SpareDelay,
            re(r"Setting spare delay.*?(\d+\.\d+)\s*milliseconds"),
            millis,
        ),
        (
            Field::ActiveLinks,
            re(r"returning (\d+) links.*?IDs:\s*\[(.*?)\]"),
            first_group,
        ),
        (Field::Encryption, re(r"Encryption (enabled|disabled)"), first_group),
    ],
    transition: re(r#"Entering state "([^"]+)" of state machine "([^"]+)""#),
    readiness: re(r"Got readiness:.*?'video':\s*'([^']+)'"),
    status: re(r"Got status message.*?'([^']+)'"),
    stops: vec![
        re(r"(?i)Stop command from the lu100 GUI"),
        re(r"(?i)(?:stop|end|terminate|disconnect).*session"),
        re(r"(?i)(?:disconnected|connection lost|stream ended)"),
    ],
});

/// Session id carried by a line, if any.
pub fn session_id(line: &str) -> Option<&str> {
    PATTERNS
        .session_id
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Classify one line. Lines without a session id yield `None`.
pub fn classify(line: &str) -> Option<LineObservation> {
    let p = &*PATTERNS;
    let session_id = session_id(line)?.to_string();

    let fields = p
        .fields
        .iter()
        .filter_map(|(field, regex, value)| regex.captures(line).map(|caps| (*field, value(&caps))))
        .collect();

    let mut events = Vec::new();
    if let Some(at) = timestamp::search(line).get() {
        if let Some(caps) = p.transition.captures(line) {
            events.push(ObservedEvent {
                timestamp: at,
                kind: EventKind::Transition,
                label: caps[1].to_string(),
                token: None,
            });
        }
        if let Some(caps) = p.readiness.captures(line) {
            events.push(ObservedEvent {
                timestamp: at,
                kind: EventKind::Readiness,
                label: format!("Video: {}", &caps[1]),
                token: Some(caps[1].to_string()),
            });
        }
        if let Some(caps) = p.status.captures(line) {
            events.push(ObservedEvent {
                timestamp: at,
                kind: EventKind::Status,
                label: format!("Status: {}", &caps[1]),
                token: Some(caps[1].to_string()),
            });
        }
        if p.stops.iter().any(|stop| stop.is_match(line)) {
            events.push(ObservedEvent {
                timestamp: at,
                kind: EventKind::End,
                label: STOPPED_LABEL.to_string(),
                token: None,
            });
        }
    }

    Some(LineObservation {
        session_id,
        fields,
        events,
    })
}
