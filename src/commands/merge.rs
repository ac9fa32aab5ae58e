//! Merge command handler

use anyhow::Result;
use std::path::Path;

use bondlog::cli::ArchiveArgs;
use bondlog::pipeline;
use bondlog::Outcome;

use super::{emit, load_settings, read_archive, to_json, write_output};

/// Merge the rotated log family inside an archive.
///
/// Plain mode writes the merged text; `--json` writes the full envelope
/// with metadata.
#[cfg(not(tarpaulin_include))]
pub fn handle(input: &ArchiveArgs, output: Option<&Path>, json: bool) -> Result<()> {
    let settings = load_settings()?;
    let result = read_archive(&input.archive).and_then(|(bytes, filename)| {
        pipeline::merge_archive(
            &bytes,
            &filename,
            input.start.as_deref(),
            input.end.as_deref(),
            &settings,
        )
    });

    if json {
        let outcome = Outcome::from(result);
        return match output {
            Some(_) => {
                write_output(output, &to_json(&outcome)?)?;
                match outcome.error {
                    Some(message) => Err(anyhow::anyhow!(message)),
                    None => Ok(()),
                }
            }
            None => emit(outcome),
        };
    }

    let report = result?;
    write_output(output, &report.content)
}
