use dirmerge::{Config, ErrorKind, GroupSpec, MergeError, TreeMerger};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

mod common;
use common::write;

fn merger() -> TreeMerger {
    TreeMerger::new(Config::with_privileged_group(GroupSpec::Disabled))
}

#[test]
fn relocates_into_missing_destination() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("staging");
    let dst = td.path().join("dest");
    write(&src.join("a.txt"), "alpha");
    write(&src.join("lib/b.txt"), "beta");

    let report = merger().merge(&src, &dst)?;
    assert_eq!(report.relocated, 2);
    assert_eq!(report.merged_dirs, 0);
    assert_eq!(fs::read_to_string(dst.join("a.txt"))?, "alpha");
    assert_eq!(fs::read_to_string(dst.join("lib/b.txt"))?, "beta");
    assert!(!src.join("a.txt").exists());
    assert!(!src.join("lib").exists());
    // The root itself is never moved.
    assert!(src.is_dir());
    Ok(())
}

#[test]
fn every_leaf_moves_and_merge_points_stay_as_shells() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    let leaves = ["bin/tool", "share/doc/README", "share/man/man1/tool.1", "top.txt"];
    for leaf in leaves {
        write(&src.join(leaf), leaf);
    }
    // Pre-existing destination content that collides at directory level only.
    write(&dst.join("share/doc/OLD"), "old");
    fs::create_dir_all(dst.join("bin"))?;

    let report = merger().merge(&src, &dst)?;
    assert_eq!(report.merged_dirs, 3, "bin, share, share/doc");

    for leaf in leaves {
        assert_eq!(fs::read_to_string(dst.join(leaf))?, leaf, "missing {leaf}");
        assert!(!src.join(leaf).exists(), "{leaf} left in source");
    }
    assert_eq!(fs::read_to_string(dst.join("share/doc/OLD"))?, "old");
    for shell in ["bin", "share", "share/doc"] {
        let d = src.join(shell);
        assert!(d.is_dir(), "{shell} shell should remain");
    }
    assert_eq!(fs::read_dir(src.join("share/doc"))?.count(), 0);
    assert!(!src.join("share/man").exists(), "non-colliding subtree relocated whole");
    Ok(())
}

#[test]
fn file_onto_existing_directory_is_conflict() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    write(&src.join("a"), "file");
    fs::create_dir_all(dst.join("a")).unwrap();

    let err = merger().merge(&src, &dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(&err, MergeError::Conflict { path } if path == &dst.join("a")));
    assert_eq!(err.to_string(), format!("{}: Is a directory", dst.join("a").display()));
    // Nothing was moved for the conflicting entry.
    assert!(src.join("a").is_file());
}

#[test]
fn directory_onto_directory_is_not_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    write(&src.join("sub/new.txt"), "new");
    write(&dst.join("sub/existing.txt"), "existing");

    let report = merger().merge(&src, &dst)?;
    assert_eq!(report.merged_dirs, 1);
    assert_eq!(report.relocated, 1);
    assert_eq!(fs::read_to_string(dst.join("sub/new.txt"))?, "new");
    assert_eq!(fs::read_to_string(dst.join("sub/existing.txt"))?, "existing");
    assert!(src.join("sub").is_dir());
    Ok(())
}

#[test]
fn file_replaces_existing_file() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    write(&src.join("VERSION"), "2");
    write(&dst.join("VERSION"), "1");

    merger().merge(&src, &dst)?;
    assert_eq!(fs::read_to_string(dst.join("VERSION"))?, "2");
    Ok(())
}

#[test]
fn directory_onto_existing_file_fails_with_io_error() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    write(&src.join("x/inner"), "i");
    write(&dst.join("x"), "plain file");

    let err = merger().merge(&src, &dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OtherIo);
    assert_eq!(err.io_error().and_then(std::io::Error::raw_os_error), Some(libc::ENOTDIR));
    assert_eq!(fs::read_to_string(dst.join("x")).unwrap(), "plain file");
}

#[test]
fn conflict_aborts_without_rolling_back_earlier_moves() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    // Sorted order: "a" is relocated before "b" conflicts.
    write(&src.join("a"), "moved");
    write(&src.join("b"), "conflicting");
    fs::create_dir_all(dst.join("b")).unwrap();

    assert!(merger().merge(&src, &dst).is_err());
    assert!(dst.join("a").is_file());
    assert!(!src.join("a").exists());
    assert!(src.join("b").is_file());
}

#[test]
fn source_must_be_a_directory() {
    let td = tempdir().unwrap();
    let file = td.path().join("f");
    write(&file, "x");
    let err = merger().merge(&file, &td.path().join("dst")).unwrap_err();
    assert!(matches!(err, MergeError::SourceNotDirectory { .. }));
    assert!(!Path::new(&td.path().join("dst")).exists());
}
