//! Chronological merge of a rotated log family.
//!
//! Every segment is read in full, each non-blank line gets a
//! [`Stamp`](crate::timestamp::Stamp), and the retained lines are
//! stable-sorted by stamp. Lines sharing a stamp (common at one-second
//! resolution) keep their source-then-file order.
//! Without a date range every line is kept and unparsed lines collate to the
//! front; with a range, unparsed and out-of-range lines are dropped.

mod report;

pub use report::{LogLine, MergeMetadata, MergeReport, SpanInfo};

use tracing::{debug, info};

use crate::archive::members::read_text;
use crate::error::{Error, Result};
use crate::range::TimeRange;
use crate::rotation::LogSource;
use crate::timestamp::TimestampParser;

/// Merges log segments into one ordered stream.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    base_name: String,
    parser: TimestampParser,
}

impl MergeEngine {
    /// Engine for the family named `base_name`, using the current year for
    /// syslog stamps.
    pub fn new(base_name: impl Into<String>) -> Self {
        Self::with_parser(base_name, TimestampParser::new())
    }

    pub fn with_parser(base_name: impl Into<String>, parser: TimestampParser) -> Self {
        Self {
            base_name: base_name.into(),
            parser,
        }
    }

    /// Read and merge `sources`, in the order given.
    pub fn merge(&self, sources: &[LogSource], range: &TimeRange) -> Result<MergeReport> {
        let mut texts = Vec::with_capacity(sources.len());
        for source in sources {
            debug!(
                file = %source.basename(),
                rotation = source.rotation,
                "reading log segment"
            );
            texts.push(read_text(&source.path, source.compressed)?);
        }
        let borrowed: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.merge_texts(sources, &borrowed, range)
    }

    /// Merge already-decoded segment texts; `texts[i]` belongs to
    /// `sources[i]`, so both slices must have the same length.
    pub fn merge_texts(
        &self,
        sources: &[LogSource],
        texts: &[&str],
        range: &TimeRange,
    ) -> Result<MergeReport> {
        if sources.len() != texts.len() {
            return Err(Error::Processing(format!(
                "{} log sources but {} segment texts",
                sources.len(),
                texts.len()
            )));
        }
        let filtering = range.is_active();
        let mut scanned = 0usize;
        let mut filtered = 0usize;
        let mut kept: Vec<LogLine> = Vec::new();

        for (index, text) in texts.iter().enumerate() {
            for raw in text.lines() {
                if raw.trim().is_empty() {
                    continue;
                }
                scanned += 1;
                let stamp = self.parser.parse_line(raw);

                if filtering && !range.admits(&stamp) {
                    filtered += 1;
                    continue;
                }
                kept.push(LogLine {
                    stamp,
                    text: raw.trim_end().to_string(),
                    source: index,
                });
            }
        }

        // Vec::sort_by_key is stable.
        kept.sort_by_key(|line| line.stamp);

        info!(
            files = sources.len(),
            scanned,
            included = kept.len(),
            filtered,
            "merged log family"
        );

        let content = report::render(&self.base_name, sources, &kept, scanned, range);
        let metadata = MergeMetadata {
            total_files: sources.len(),
            files_processed: sources.iter().map(LogSource::basename).collect(),
            total_lines_processed: scanned,
            total_entries: kept.len(),
            lines_filtered_out: filtered,
            time_range: report::span(&kept),
            filter_applied: range.applied(),
        };
        Ok(MergeReport { content, metadata })
    }
}
