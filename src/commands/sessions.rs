//! Sessions command handler

use anyhow::Result;

use bondlog::cli::ArchiveArgs;
use bondlog::pipeline;
use bondlog::Outcome;

use super::{emit, load_settings, read_archive};

/// Print reconstructed sessions and aggregates as a JSON envelope.
#[cfg(not(tarpaulin_include))]
pub fn handle(input: &ArchiveArgs) -> Result<()> {
    let settings = load_settings()?;
    let result = read_archive(&input.archive).and_then(|(bytes, filename)| {
        pipeline::analyze_sessions(
            &bytes,
            &filename,
            input.start.as_deref(),
            input.end.as_deref(),
            &settings,
        )
    });
    emit(Outcome::from(result))
}
