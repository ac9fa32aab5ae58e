//! Archive handling.
//!
//! - [`extract`] - suffix dispatch and unpacking into a scratch directory
//! - [`members`] - deterministic traversal and decoding of extracted files

pub mod extract;
pub mod members;

pub use extract::{ArchiveFormat, Extraction, Extractor};
pub use members::{read_members, read_text, walk, DirListing, Member};
