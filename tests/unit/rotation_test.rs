//! Unit tests for log family discovery

use bondlog::rotation::{resolve, rotation_of};
use bondlog::Error;
use tempfile::TempDir;

use crate::helpers::{gz, write_tree};

#[test]
fn rotation_numbers() {
    assert_eq!(rotation_of("messages.log", "messages.log"), Some((0, false)));
    assert_eq!(rotation_of("messages.log.12.gz", "messages.log"), Some((12, true)));
    assert_eq!(rotation_of("messages.log.old", "messages.log"), None);
    assert_eq!(rotation_of("messages.log.1", "messages.log"), None);
    assert_eq!(rotation_of("messages.log..gz", "messages.log"), None);
}

#[test]
fn family_is_ordered_oldest_first() {
    let temp = TempDir::new().unwrap();
    let rotated = gz("x\n");
    write_tree(
        temp.path(),
        &[
            ("var/log/messages.log", b"live\n".as_slice()),
            ("var/log/messages.log.1.gz", rotated.as_slice()),
            ("var/log/messages.log.10.gz", rotated.as_slice()),
            ("var/log/messages.log.2.gz", rotated.as_slice()),
            ("var/log/messages.log.bak", b"ignored\n".as_slice()),
        ],
    );
    let sources = resolve(temp.path(), "messages.log").unwrap();
    let rotations: Vec<u32> = sources.iter().map(|s| s.rotation).collect();
    assert_eq!(rotations, vec![10, 2, 1, 0]);
    assert!(!sources.last().unwrap().compressed);
}

#[test]
fn first_directory_in_traversal_order_wins() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("a/messages.log", b"first\n".as_slice()),
            ("b/messages.log", b"second\n".as_slice()),
        ],
    );
    let sources = resolve(temp.path(), "messages.log").unwrap();
    assert_eq!(sources.len(), 1);
    assert!(sources[0].path.ends_with("a/messages.log"));
}

#[test]
fn missing_family_is_not_found() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("etc/hostname", b"unit\n".as_slice())]);
    assert!(matches!(
        resolve(temp.path(), "messages.log"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn prefix_only_directory_is_still_authoritative() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("a/messages.log.bak", b"backup\n".as_slice()),
            ("b/messages.log", b"live\n".as_slice()),
        ],
    );
    assert!(matches!(
        resolve(temp.path(), "messages.log"),
        Err(Error::NotFound { .. })
    ));
}
