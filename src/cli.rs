//! CLI definitions for bondlog
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so they can be accessed by xtask for documentation generation (man pages, markdown).

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "bondlog")]
#[command(about = "[ bondlog ] - merge and mine diagnostic archives from bonded-modem units")]
#[command(
    long_about = "bondlog - Extract diagnostic archives from bonded-modem streaming units.

Archives are dispatched by suffix (.tar.bz2, .bz2, .tar). Rotated log segments
are merged into one chronological stream, modem statistics become telemetry
records, and session-tagged lines become per-session timelines.

QUICK START:
    bondlog merge unit.tar.bz2 -o merged.log     Merge messages.log segments
    bondlog telemetry unit.tar.bz2               Modem statistics as JSON
    bondlog sessions unit.tar.bz2                Session timelines as JSON

DATE RANGES:
    --start / --end accept YYYY-MM-DD, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS.
    A date-only end covers the whole day."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Archive input plus optional date bounds, shared by the archive commands.
#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Archive file (.tar.bz2, .bz2 or .tar)
    #[arg(help = "Archive file (.tar.bz2, .bz2 or .tar)")]
    pub archive: PathBuf,

    /// Earliest instant to include
    #[arg(long, help = "Earliest instant to include (YYYY-MM-DD[ HH:MM[:SS]])")]
    pub start: Option<String>,

    /// Latest instant to include
    #[arg(long, help = "Latest instant to include (YYYY-MM-DD[ HH:MM[:SS]])")]
    pub end: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge rotated log segments chronologically
    #[command(long_about = "Merge the rotated messages.log family inside an archive into one
chronologically ordered stream.

Each segment (messages.log, messages.log.1.gz, ...) is read in full, every line
is timestamped, and lines are stable-sorted. A '# Source:' marker is written
whenever the originating segment changes.

EXAMPLES:
    bondlog merge unit.tar.bz2
    bondlog merge unit.tar.bz2 --start 2025-09-23 --end 2025-09-23 -o day.log
    bondlog merge unit.tar.bz2 --json")]
    Merge {
        #[command(flatten)]
        input: ArchiveArgs,

        /// Write the merged log to a file instead of stdout
        #[arg(long, short, help = "Write the merged log to FILE")]
        output: Option<PathBuf>,

        /// Print the JSON envelope (content and metadata) instead of plain text
        #[arg(long, help = "Print the JSON envelope instead of plain text")]
        json: bool,
    },

    /// Extract per-modem telemetry as JSON
    #[command(long_about = "Scan every archive member for modem statistics lines and print the
normalized records (bandwidth in Mbps) as JSON, together with overall,
per-modem and quality analytics.

With --downsample, more than 10000 records are thinned to roughly 5000 for
charting; the count and analytics still cover every record.

EXAMPLES:
    bondlog telemetry unit.tar.bz2 --start \"2025-09-23 12:00\"
    bondlog telemetry unit.tar.bz2 --downsample")]
    Telemetry {
        #[command(flatten)]
        input: ArchiveArgs,

        /// Thin large record sets to about 5000 points
        #[arg(long, help = "Thin more than 10000 records to about 5000")]
        downsample: bool,
    },

    /// Reconstruct session timelines as JSON
    #[command(long_about = "Scan every archive member for session-tagged lines and print the
reconstructed sessions, their timelines and aggregate counts as JSON.

EXAMPLE:
    bondlog sessions unit.tar.bz2 --end 2025-09-23")]
    Sessions {
        #[command(flatten)]
        input: ArchiveArgs,
    },

    /// Process a queued job description
    #[command(long_about = "Run one job: fetch the named archive from the objects directory,
extract its telemetry within the job's time range and append the records to
the JSON lines store. Records already in the store are not written twice.

EXAMPLE:
    bondlog worker job.json --objects ./objects --store ./telemetry.jsonl")]
    Worker {
        /// Job description (JSON)
        #[arg(help = "Job description file (JSON)")]
        job: PathBuf,

        /// Objects directory (default: [worker].objects_dir)
        #[arg(long, help = "Directory holding archive objects")]
        objects: Option<PathBuf>,

        /// Telemetry store (default: [worker].store_path)
        #[arg(long, help = "JSON lines telemetry store")]
        store: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(long_about = "Generate shell completion scripts.

EXAMPLE:
    bondlog completions --shell zsh > ~/.zfunc/_bondlog")]
    Completions {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    #[command(long_about = "Display the effective configuration in TOML format.

Reads $BONDLOG_CONFIG or ~/.config/bondlog/config.toml; missing values show
their defaults.")]
    Show,
}
