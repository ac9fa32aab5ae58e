//! Error taxonomy for the extraction pipeline.
//!
//! Only failures that abort a whole invocation are represented here.
//! Line-level and field-level problems (an unparseable timestamp, a date
//! bound that cannot be read) are traced and skipped instead.

use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported archive format: {filename} (expected .tar.bz2, .bz2 or .tar)")]
    UnsupportedFormat { filename: String },

    #[error("Failed to extract {filename}: {source}")]
    Extraction {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No {what} files found in archive")]
    NotFound { what: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error processing archive: {0}")]
    Processing(String),
}

impl Error {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::Extraction { .. } => "extraction_error",
            Error::NotFound { .. } => "not_found",
            Error::Io { .. } => "io_error",
            Error::Processing(_) => "processing_error",
        }
    }
}
