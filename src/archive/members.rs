//! Deterministic traversal of an extracted tree and member decoding.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Files found directly inside one directory.
#[derive(Debug, Clone)]
pub struct DirListing {
    pub dir: PathBuf,
    /// Regular files, sorted by name.
    pub files: Vec<PathBuf>,
}

/// Walk `root` top-down.
///
/// Directory entries are visited in name order and a directory's files are
/// listed before any of its subdirectories are entered, so the result is
/// stable across platforms. Symlinks are skipped.
pub fn walk(root: &Path) -> Result<Vec<DirListing>> {
    let mut out = Vec::new();
    walk_into(root, &mut out)?;
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<DirListing>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }

    out.push(DirListing {
        dir: dir.to_path_buf(),
        files,
    });
    for sub in subdirs {
        walk_into(&sub, out)?;
    }
    Ok(())
}

/// Whether a path names a gzip member.
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Read a file as lossy UTF-8, gunzipping it when `compressed` is set.
///
/// Any failure is an error; callers that want leniency use
/// [`read_members`].
pub fn read_text(path: &Path, compressed: bool) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    if !compressed {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    let mut raw = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Decoded text of one archive member.
#[derive(Debug, Clone)]
pub struct Member {
    /// Path relative to the extraction root.
    pub name: PathBuf,
    pub content: String,
}

/// Read every regular file under `root`, in traversal order.
///
/// `.gz` members are decompressed; one that fails to decompress is read
/// as plain bytes instead.
pub fn read_members(root: &Path) -> Result<Vec<Member>> {
    let mut members = Vec::new();
    for listing in walk(root)? {
        for path in listing.files {
            let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
            let content = if is_gzip(&path) {
                let mut raw = Vec::new();
                match GzDecoder::new(bytes.as_slice()).read_to_end(&mut raw) {
                    Ok(_) => String::from_utf8_lossy(&raw).into_owned(),
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "gzip member unreadable, using raw bytes"
                        );
                        String::from_utf8_lossy(&bytes).into_owned()
                    }
                }
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            };
            let name = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            debug!(member = %name.display(), bytes = content.len(), "member read");
            members.push(Member { name, content });
        }
    }
    Ok(members)
}
