//! Rotated log family discovery.
//!
//! A log family is the live file `<base>` (rotation 0) plus its rotated,
//! gzipped siblings `<base>.<N>.gz` (rotation N, larger is older).

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::archive::members::walk;
use crate::error::{Error, Result};

/// One segment of a rotated log family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSource {
    pub path: PathBuf,
    pub rotation: u32,
    pub compressed: bool,
}

impl LogSource {
    /// File name without directories, for labels.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Rotation number encoded in `name`, if it belongs to the family of `base`.
pub fn rotation_of(name: &str, base: &str) -> Option<(u32, bool)> {
    if name == base {
        return Some((0, false));
    }
    let digits = name
        .strip_prefix(base)?
        .strip_prefix('.')?
        .strip_suffix(".gz")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (n, true))
}

/// Collect the family of `base` inside a single directory, oldest first.
pub fn sources_in(dir: &Path, files: &[PathBuf], base: &str) -> Vec<LogSource> {
    let mut sources: Vec<LogSource> = files
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let (rotation, compressed) = rotation_of(name, base)?;
            Some(LogSource {
                path: dir.join(name),
                rotation,
                compressed,
            })
        })
        .collect();
    sources.sort_by(|a, b| b.rotation.cmp(&a.rotation));
    sources
}

/// Locate the log family under an extraction root.
///
/// The first directory in traversal order holding any file whose name
/// starts with `base` is authoritative; later ones are ignored.
pub fn resolve(root: &Path, base: &str) -> Result<Vec<LogSource>> {
    let not_found = || Error::NotFound {
        what: base.to_string(),
    };

    let candidates: Vec<_> = walk(root)?
        .into_iter()
        .filter(|listing| {
            listing.files.iter().any(|f| {
                f.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(base))
                    .unwrap_or(false)
            })
        })
        .collect();

    let Some(chosen) = candidates.first() else {
        return Err(not_found());
    };
    for ignored in candidates.iter().skip(1) {
        debug!(dir = %ignored.dir.display(), "ignoring additional log directory");
    }

    let sources = sources_in(&chosen.dir, &chosen.files, base);
    if sources.is_empty() {
        return Err(not_found());
    }
    debug!(
        dir = %chosen.dir.display(),
        segments = sources.len(),
        "resolved log family"
    );
    Ok(sources)
}
