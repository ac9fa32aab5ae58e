//! Integration tests for archive extraction and member reading

use std::fs;

use bondlog::archive::{read_members, ArchiveFormat, Extractor};
use bondlog::Error;
use tempfile::TempDir;

use crate::helpers::{bz2, gz, sample_tar, sample_tar_bz2, tar_bytes, write_file};

#[test]
fn tar_bz2_unpacks_every_member() {
    let extraction = Extractor::new()
        .extract(&sample_tar_bz2(), "unit.tar.bz2")
        .unwrap();
    assert_eq!(extraction.format(), ArchiveFormat::TarBz2);
    assert_eq!(extraction.member_count(), 3);
    assert!(extraction.root().join("dump/var/log/messages.log").is_file());
    assert!(extraction.root().join("dump/var/log/bond/service.log").is_file());
}

#[test]
fn plain_tar_unpacks() {
    let extraction = Extractor::new().extract(&sample_tar(), "UNIT.TAR").unwrap();
    assert_eq!(extraction.format(), ArchiveFormat::Tar);
    assert_eq!(extraction.member_count(), 3);
}

#[test]
fn mislabeled_bz2_is_read_as_tarball() {
    let extraction = Extractor::new()
        .extract(&sample_tar_bz2(), "unit.bz2")
        .unwrap();
    assert_eq!(extraction.format(), ArchiveFormat::Bz2);
    assert!(extraction.root().join("dump/var/log/messages.log").is_file());
}

#[test]
fn bare_bz2_of_plain_text_becomes_single_member() {
    let extraction = Extractor::new()
        .extract(&bz2(b"just one log line\n"), "messages.log.bz2")
        .unwrap();
    assert_eq!(extraction.member_count(), 1);

    let members = read_members(extraction.root()).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name.to_str(), Some("messages.log"));
    assert_eq!(members[0].content, "just one log line\n");
}

#[test]
fn unsupported_suffix_is_rejected_before_any_io() {
    let scratch = TempDir::new().unwrap();
    let err = Extractor::with_scratch_root(scratch.path())
        .extract(b"PK\x03\x04", "unit.zip")
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn scratch_directory_is_removed_on_drop() {
    let scratch = TempDir::new().unwrap();
    let extractor = Extractor::with_scratch_root(scratch.path());
    let root = {
        let extraction = extractor.extract(&sample_tar(), "unit.tar").unwrap();
        assert!(extraction.root().exists());
        extraction.root().to_path_buf()
    };
    assert!(!root.exists());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn corrupt_archive_leaves_no_scratch_behind() {
    let scratch = TempDir::new().unwrap();
    let err = Extractor::with_scratch_root(scratch.path())
        .extract(b"definitely not bzip2", "unit.tar.bz2")
        .unwrap_err();
    assert!(matches!(err, Error::Extraction { .. }));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn extract_path_uses_the_file_name() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "unit.tar.bz2", &sample_tar_bz2());
    let extraction = Extractor::new().extract_path(&path).unwrap();
    assert_eq!(extraction.format(), ArchiveFormat::TarBz2);
}

#[test]
fn members_are_gunzipped_in_traversal_order() {
    let extraction = Extractor::new().extract(&sample_tar(), "unit.tar").unwrap();
    let members = read_members(extraction.root()).unwrap();
    let names: Vec<String> = members
        .iter()
        .map(|m| m.name.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "dump/var/log/messages.log",
            "dump/var/log/messages.log.1.gz",
            "dump/var/log/bond/service.log",
        ]
    );
    assert!(members[1].content.starts_with("2025-09-23T12:00:02 rotated first"));
}

#[test]
fn broken_gzip_member_falls_back_to_raw_text() {
    let mut fake = gz("ignored");
    fake.truncate(4);
    fake.extend_from_slice(b" plain tail");
    let archive = tar_bytes(&[("logs/app.log.gz", fake.as_slice())]);
    let extraction = Extractor::new().extract(&archive, "a.tar").unwrap();
    let members = read_members(extraction.root()).unwrap();
    assert_eq!(members.len(), 1);
    assert!(members[0].content.ends_with(" plain tail"));
}
