//! bondlog - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bondlog::cli::{Cli, Commands, ConfigCommands};

/// Install the stderr fmt layer. `RUST_LOG` wins over the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bondlog={}", level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Merge {
            input,
            output,
            json,
        } => commands::merge::handle(&input, output.as_deref(), json),
        Commands::Telemetry { input, downsample } => {
            commands::telemetry::handle(&input, downsample)
        }
        Commands::Sessions { input } => commands::sessions::handle(&input),
        Commands::Worker {
            job,
            objects,
            store,
        } => commands::worker::handle(&job, objects, store),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}
