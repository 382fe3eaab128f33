//! Archive pipeline properties spanning expansion and flattening.

use crate::common::{evil_tar_gz, tar_gz_bytes, zip_bytes};
use ghrab::archive::{expand, flatten_single_dir};
use ghrab::core::GhrabError;

#[test]
fn zip_expand_then_flatten_unwraps_the_top_directory() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = zip_bytes(&[("root/file1", b"one"), ("root/sub/file2", b"two")]);

    expand(&bytes, "pkg.zip", dir.path(), true).unwrap();
    assert!(flatten_single_dir(dir.path()).unwrap());

    assert!(dir.path().join("file1").is_file());
    assert!(dir.path().join("sub/file2").is_file());
    assert!(!dir.path().join("root").exists());
}

#[test]
fn already_flat_archive_survives_flatten_flag() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = tar_gz_bytes(&[("a.txt", b"a"), ("b.txt", b"b")]);

    expand(&bytes, "flat.tar.gz", dir.path(), true).unwrap();
    assert!(!flatten_single_dir(dir.path()).unwrap());

    assert!(dir.path().join("a.txt").is_file());
    assert!(dir.path().join("b.txt").is_file());
}

#[test]
fn extract_disabled_preserves_magic_bytes_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes) in [
        ("pkg.zip", zip_bytes(&[("f", b"x" as &[u8])])),
        ("pkg.tar.gz", tar_gz_bytes(&[("f", b"x")])),
    ] {
        expand(&bytes, name, dir.path(), false).unwrap();
        let on_disk = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(on_disk, bytes, "{name} must be copied verbatim");
    }
}

#[test]
fn traversal_entry_fails_whole_archive() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    let bytes = evil_tar_gz(b"../../escape");

    let err = expand(&bytes, "evil.tar.gz", &dest, true).unwrap_err();
    assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "unsafe-archive");
    assert!(!dest.exists(), "nothing may be written for a rejected archive");
}

#[test]
fn successive_expands_merge_into_destination() {
    let dir = tempfile::tempdir().unwrap();

    expand(&zip_bytes(&[("shared/a", b"a")]), "a.zip", dir.path(), true).unwrap();
    expand(&zip_bytes(&[("shared/b", b"b")]), "b.zip", dir.path(), true).unwrap();

    assert!(dir.path().join("shared/a").is_file());
    assert!(dir.path().join("shared/b").is_file());
}
