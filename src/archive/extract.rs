//! Suffix-dispatched archive extraction into a scoped scratch directory.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use humansize::{format_size, BINARY};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Member name used when a bare `.bz2` stem is empty.
const FALLBACK_MEMBER_NAME: &str = "extracted";

/// Container formats recognized by declared filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.bz2`
    TarBz2,
    /// Bare `.bz2`: usually a mislabeled tarball, sometimes a single file.
    Bz2,
    /// `.tar`
    Tar,
}

impl ArchiveFormat {
    /// Select the format from a declared filename.
    ///
    /// Matching is case-insensitive and checked in priority order, so
    /// `x.tar.bz2` is `TarBz2` rather than `Bz2`.
    pub fn detect(filename: &str) -> Result<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".tar.bz2") {
            Ok(ArchiveFormat::TarBz2)
        } else if lower.ends_with(".bz2") {
            Ok(ArchiveFormat::Bz2)
        } else if lower.ends_with(".tar") {
            Ok(ArchiveFormat::Tar)
        } else {
            Err(Error::UnsupportedFormat {
                filename: filename.to_string(),
            })
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::Bz2 => "bz2",
            ArchiveFormat::Tar => "tar",
        }
    }
}

/// An unpacked archive.
///
/// Owns the scratch directory; it is deleted when this value is dropped.
#[derive(Debug)]
pub struct Extraction {
    dir: TempDir,
    format: ArchiveFormat,
    members: usize,
}

impl Extraction {
    /// Root of the extracted tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Number of regular files written.
    pub fn member_count(&self) -> usize {
        self.members
    }
}

/// Unpacks archives into uniquely named scratch directories.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    scratch_root: Option<PathBuf>,
}

impl Extractor {
    /// Extractor using the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place scratch directories under `root` instead of the system default.
    pub fn with_scratch_root(root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: Some(root.into()),
        }
    }

    /// Extract `bytes`, dispatching on the suffix of `filename`.
    ///
    /// The suffix is checked before any scratch directory is created.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<Extraction> {
        let format = ArchiveFormat::detect(filename)?;
        info!(
            filename,
            format = format.label(),
            size = %format_size(bytes.len(), BINARY),
            "extracting archive"
        );

        let dir = self.scratch_dir(filename)?;
        let wrap = |source: io::Error| Error::Extraction {
            filename: filename.to_string(),
            source,
        };

        let members = match format {
            ArchiveFormat::TarBz2 => {
                unpack_tar(MultiBzDecoder::new(bytes), dir.path()).map_err(wrap)?
            }
            ArchiveFormat::Tar => unpack_tar(bytes, dir.path()).map_err(wrap)?,
            ArchiveFormat::Bz2 => unpack_bare_bz2(bytes, filename, dir.path()).map_err(wrap)?,
        };

        debug!(root = %dir.path().display(), members, "archive extracted");
        Ok(Extraction {
            dir,
            format,
            members,
        })
    }

    /// Read an archive from disk and extract it, using its file name as the
    /// declared filename.
    pub fn extract_path(&self, path: &Path) -> Result<Extraction> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ArchiveFormat::detect(&filename)?;
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        self.extract(&bytes, &filename)
    }

    fn scratch_dir(&self, filename: &str) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("bondlog-");
        let created = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|source| Error::Extraction {
            filename: filename.to_string(),
            source,
        })
    }
}

/// Unpack every entry of a tar stream under `dest`.
///
/// Entries that would escape `dest` are skipped by the tar crate. Returns
/// the number of regular files written.
fn unpack_tar<R: Read>(reader: R, dest: &Path) -> io::Result<usize> {
    let mut archive = tar::Archive::new(reader);
    let mut files = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let is_file = entry.header().entry_type().is_file();
        if entry.unpack_in(dest)? && is_file {
            files += 1;
        }
    }
    Ok(files)
}

/// A bare `.bz2` is tried as a tarball first; when the payload has no tar
/// structure it is written out as one member.
fn unpack_bare_bz2(bytes: &[u8], filename: &str, dest: &Path) -> io::Result<usize> {
    let mut raw = Vec::new();
    MultiBzDecoder::new(bytes).read_to_end(&mut raw)?;

    match unpack_tar(raw.as_slice(), dest) {
        Ok(files) if files > 0 => return Ok(files),
        Ok(_) => debug!("bz2 payload has no tar members, treating as single file"),
        Err(e) => debug!(error = %e, "bz2 payload is not a tar archive, treating as single file"),
    }

    clear_dir(dest)?;
    fs::write(dest.join(single_member_name(filename)), &raw)?;
    Ok(1)
}

/// Basename of the declared filename with the `.bz2` suffix removed.
pub(crate) fn single_member_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = if base.to_ascii_lowercase().ends_with(".bz2") {
        &base[..base.len() - 4]
    } else {
        base.as_str()
    };
    if stem.is_empty() || stem == "." || stem == ".." {
        FALLBACK_MEMBER_NAME.to_string()
    } else {
        stem.to_string()
    }
}

/// Remove partial output left by a failed tar attempt.
fn clear_dir(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
