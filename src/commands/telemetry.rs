//! Telemetry command handler

use anyhow::Result;

use bondlog::cli::ArchiveArgs;
use bondlog::pipeline::{self, TelemetryReport};
use bondlog::Outcome;

use super::{emit, load_settings, read_archive};

/// Print the modem statistics found in an archive, with their analytics,
/// as a JSON envelope.
#[cfg(not(tarpaulin_include))]
pub fn handle(input: &ArchiveArgs, downsample: bool) -> Result<()> {
    let settings = load_settings()?;
    let result = read_archive(&input.archive).and_then(|(bytes, filename)| {
        pipeline::extract_telemetry(
            &bytes,
            &filename,
            input.start.as_deref(),
            input.end.as_deref(),
            &settings,
        )
    });
    emit(Outcome::from(
        result.map(|records| TelemetryReport::new(records, downsample)),
    ))
}
