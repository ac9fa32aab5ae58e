//! Merge output: the text artifact and its metadata.

use serde::Serialize;

use crate::range::{AppliedFilter, TimeRange};
use crate::rotation::LogSource;
use crate::timestamp::Stamp;

/// A retained log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub stamp: Stamp,
    /// Line text with trailing whitespace removed.
    pub text: String,
    /// Index into the source list the line came from.
    pub source: usize,
}

/// Earliest and latest retained instants. Omitted when invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpanInfo {
    pub earliest: Option<Stamp>,
    pub latest: Option<Stamp>,
}

/// Counters and bounds describing a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeMetadata {
    pub total_files: usize,
    pub files_processed: Vec<String>,
    pub total_lines_processed: usize,
    pub total_entries: usize,
    pub lines_filtered_out: usize,
    pub time_range: SpanInfo,
    pub filter_applied: AppliedFilter,
}

/// Result of merging a log family.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub content: String,
    pub metadata: MergeMetadata,
}

/// Render the merged text: header block, then lines with a source marker
/// wherever the contributing source changes.
pub(crate) fn render(
    base_name: &str,
    sources: &[LogSource],
    lines: &[LogLine],
    scanned: usize,
    range: &TimeRange,
) -> String {
    let mut out: Vec<String> = vec![format!(
        "# Merged {} files in chronological order",
        base_name
    )];

    if range.is_active() {
        out.push("# Date range filter applied:".to_string());
        if let Some(start) = range.start {
            out.push(format!("#   From: {}", start.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(end) = range.end {
            out.push(format!("#   To: {}", end.format("%Y-%m-%d %H:%M:%S")));
        }
        out.push(format!("#   Lines included: {} of {}", lines.len(), scanned));
    }

    out.push(format!("# Generated from {} log files", sources.len()));
    out.push(format!("# Total entries: {}", lines.len()));
    out.push(format!("#{}", "=".repeat(80)));
    out.push(String::new());

    let mut current: Option<usize> = None;
    for line in lines {
        if current != Some(line.source) {
            let source = &sources[line.source];
            out.push(String::new());
            out.push(format!(
                "# Source: {} (rotation {})",
                source.basename(),
                source.rotation
            ));
            current = Some(line.source);
        }
        out.push(line.text.clone());
    }

    out.join("\n")
}

/// First and last retained stamps, dropping invalid ones.
pub(crate) fn span(lines: &[LogLine]) -> SpanInfo {
    let valid = |line: Option<&LogLine>| line.map(|l| l.stamp).filter(Stamp::is_valid);
    SpanInfo {
        earliest: valid(lines.first()),
        latest: valid(lines.last()),
    }
}
