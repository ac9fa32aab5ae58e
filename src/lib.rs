//! bondlog library
//!
//! Turns diagnostic archives from bonded-modem streaming units into a
//! chronologically merged log, per-modem telemetry records and per-session
//! timelines.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod range;
pub mod rotation;
pub mod session;
pub mod telemetry;
pub mod timestamp;
pub mod worker;

pub use config::Config;
pub use error::{Error, Result};
pub use merge::{MergeEngine, MergeReport};
pub use pipeline::{Outcome, Settings};
pub use range::TimeRange;
pub use session::{SessionRecord, SessionReport};
pub use telemetry::TelemetryRecord;
pub use timestamp::{Stamp, TimestampParser};
