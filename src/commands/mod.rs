//! Command handlers for the bondlog CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod completions;
pub mod config;
pub mod merge;
pub mod sessions;
pub mod telemetry;
pub mod worker;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use bondlog::{Config, Outcome, Settings};

/// Archive bytes and the file name used to pick its format.
pub fn read_archive(path: &Path) -> bondlog::Result<(Vec<u8>, String)> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(path).map_err(|e| bondlog::Error::io(path, e))?;
    Ok((bytes, filename))
}

/// Pipeline settings from the loaded configuration.
pub fn load_settings() -> Result<Settings> {
    let config = Config::load()?;
    Ok(Settings::from_config(&config))
}

/// Serialize as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Print the envelope, then turn a failed outcome into an error so the
/// process exits non-zero.
pub fn emit<T: Serialize>(outcome: Outcome<T>) -> Result<()> {
    println!("{}", to_json(&outcome)?);
    match outcome.error {
        Some(message) if !outcome.success => Err(anyhow!(message)),
        _ => Ok(()),
    }
}

/// Write `text` to `output`, or stdout when no file was given.
pub fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
