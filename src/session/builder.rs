//! Per-session accumulation.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::rules::{Field, FieldRule, LineObservation, ObservedEvent};
use super::types::{
    EventKind, FinalStatus, NetworkConfig, SessionEvent, SessionRecord, StreamingConfig,
};
use crate::timestamp::Stamp;

/// Mutable state for one session while lines are being applied.
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    session_id: String,
    fields: HashMap<Field, String>,
    audio_ports: Vec<String>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    final_status: FinalStatus,
    timeline: Vec<ObservedEvent>,
}

impl SessionBuilder {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    /// Fold one observation into this session.
    pub fn apply(&mut self, observation: LineObservation) {
        for (field, value) in observation.fields {
            self.set(field, value);
        }
        for event in observation.events {
            self.record(event);
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field.rule() {
            FieldRule::FirstWins => {
                self.fields.entry(field).or_insert(value);
            }
            FieldRule::LastWins => {
                self.fields.insert(field, value);
            }
            FieldRule::Append => self.audio_ports.push(value),
        }
    }

    fn record(&mut self, event: ObservedEvent) {
        match event.kind {
            EventKind::Transition => {
                self.start_time.get_or_insert(event.timestamp);
            }
            EventKind::Readiness => {
                if let Some(token) = &event.token {
                    self.final_status = FinalStatus::from_token(token);
                }
            }
            EventKind::Status => match event.token.as_deref() {
                Some(token @ ("collecting" | "streaming")) => {
                    self.final_status = FinalStatus::from_token(token);
                }
                _ => {}
            },
            EventKind::End => {
                self.end_time.get_or_insert(event.timestamp);
            }
        }
        self.timeline.push(event);
    }

    fn field(&self, field: Field) -> Option<String> {
        self.fields.get(&field).cloned()
    }

    /// Sort the timeline and derive durations.
    pub fn finish(mut self) -> SessionRecord {
        self.timeline.sort_by_key(|event| event.timestamp);

        let mut timeline: Vec<SessionEvent> = self
            .timeline
            .iter()
            .map(|event| SessionEvent {
                timestamp: event.timestamp,
                label: event.label.clone(),
                kind: event.kind,
                duration_to_next_sec: None,
            })
            .collect();
        for i in 1..timeline.len() {
            let next = timeline[i].timestamp;
            timeline[i - 1].duration_to_next_sec = seconds_between(timeline[i - 1].timestamp, next);
        }

        let setup_duration_sec = match (self.final_status.is_streaming(), self.start_time) {
            (true, Some(start)) => timeline
                .iter()
                .find(|event| event.label.to_lowercase().contains("streaming"))
                .and_then(|event| seconds_between(start, event.timestamp)),
            _ => None,
        };

        let session_duration_sec = self.start_time.and_then(|start| {
            let end = self.end_time.or_else(|| timeline.last().map(|e| e.timestamp))?;
            seconds_between(start, end)
        });

        SessionRecord {
            unit_name: self.field(Field::UnitName),
            server_instance: self.field(Field::ServerInstance),
            server_version: self.field(Field::ServerVersion),
            start_time: self.start_time,
            end_time: self.end_time,
            session_duration_sec,
            setup_duration_sec,
            network_config: NetworkConfig {
                collector_address: self.field(Field::CollectorAddress),
                ifb_address: self.field(Field::IfbAddress),
                stun_server: self.field(Field::StunServer),
                video_port: self.field(Field::VideoPort),
                audio_ports: std::mem::take(&mut self.audio_ports),
            },
            streaming_config: StreamingConfig {
                profile: self.field(Field::Profile),
                spare_delay: self.field(Field::SpareDelay),
                active_links: self.field(Field::ActiveLinks),
                encryption: self.field(Field::Encryption).map(|v| v == "enabled"),
            },
            final_status: self.final_status,
            session_id: self.session_id,
            timeline,
        }
    }
}

fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> Option<f64> {
    Stamp::new(from).seconds_until(&Stamp::new(to))
}

/// Builders keyed by session id, in first-seen order.
#[derive(Debug, Default)]
pub struct SessionSet {
    index: HashMap<String, usize>,
    builders: Vec<SessionBuilder>,
}

impl SessionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, observation: LineObservation) {
        let slot = match self.index.get(&observation.session_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.builders.len();
                self.index.insert(observation.session_id.clone(), slot);
                self.builders
                    .push(SessionBuilder::new(observation.session_id.clone()));
                slot
            }
        };
        self.builders[slot].apply(observation);
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Finished records ordered by start time; sessions without one come
    /// first and ties keep first-seen order.
    pub fn finish(self) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> =
            self.builders.into_iter().map(SessionBuilder::finish).collect();
        records.sort_by_key(|record| record.start_time);
        records
    }
}
