//! Configuration management for bondlog

mod io;
mod types;

pub use io::CONFIG_ENV;
pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from `path`, or return defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Scratch parent directory, with ~ expanded
    pub fn scratch_dir(&self) -> Option<PathBuf> {
        self.archive.scratch_dir.as_deref().map(expand_home)
    }

    pub fn objects_dir(&self) -> PathBuf {
        expand_home(&self.worker.objects_dir)
    }

    pub fn store_path(&self) -> PathBuf {
        expand_home(&self.worker.store_path)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
