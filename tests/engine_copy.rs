#![cfg(unix)]

use assert_fs::prelude::*;
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;
use treeops::{EntryKind, FsErrorKind, OverwriteOption, copy};

fn kind_of(p: &Path) -> EntryKind {
    treeops::fs_ops::classify_entry(p).unwrap()
}

#[test]
fn tree_with_directory_link_keeps_link() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("root");
    src.child("a.txt").write_str("alpha")?;
    src.child("sub/b.txt").write_str("beta")?;
    symlink("sub", src.child("link").path())?;
    let dst = temp.child("out");

    let report = copy(src.path(), dst.path(), OverwriteOption::Overwrite)?;

    assert_eq!(fs::read_to_string(dst.child("a.txt").path())?, "alpha");
    assert_eq!(fs::read_to_string(dst.child("sub/b.txt").path())?, "beta");
    assert_eq!(kind_of(dst.child("sub").path()), EntryKind::Directory);
    assert_eq!(
        kind_of(dst.child("link").path()),
        EntryKind::SymbolicLink { points_to_directory: true }
    );
    assert_eq!(fs::read_link(dst.child("link").path())?, Path::new("sub"));

    assert_eq!(report.files_copied, 2);
    assert_eq!(report.links_created, 1);
    // destination root and sub
    assert_eq!(report.dirs_created, 2);
    Ok(())
}

#[test]
fn link_target_outside_tree_is_not_copied() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let outside = temp.child("outside");
    outside.child("big.bin").write_binary(&[7u8; 64])?;
    let src = temp.child("src");
    src.create_dir_all()?;
    symlink(outside.path(), src.child("ext").path())?;
    let dst = temp.child("dst");

    copy(src.path(), dst.path(), OverwriteOption::Skip)?;

    let copied = dst.child("ext");
    assert!(fs::symlink_metadata(copied.path())?.file_type().is_symlink());
    assert_eq!(fs::read_link(copied.path())?, outside.path());
    Ok(())
}

#[test]
fn dangling_link_is_copied_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("dangling");
    symlink("no/such/target", src.path())?;
    let dst = temp.child("copy");

    copy(src.path(), dst.path(), OverwriteOption::Skip)?;
    assert_eq!(fs::read_link(dst.path())?, Path::new("no/such/target"));
    Ok(())
}

#[test]
fn copy_to_root_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("tree");
    src.child("f").write_str("x")?;

    let err = copy(src.path(), Path::new("/"), OverwriteOption::Overwrite).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::RootPathViolation);
    assert!(err.to_string().starts_with("copy '"), "{err}");
    assert_eq!(fs::read_to_string(src.child("f").path())?, "x");
    Ok(())
}

#[test]
fn missing_source_is_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let err = copy(&temp.path().join("ghost"), &temp.path().join("d"), OverwriteOption::Skip).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::NotFound);
    assert!(!temp.path().join("d").exists());
}

#[test]
fn copy_into_own_subtree_is_rejected() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("tree");
    src.child("f").write_str("x").unwrap();
    let err = copy(src.path(), &src.path().join("nested/copy"), OverwriteOption::Overwrite).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::DestinationInsideSource);
    assert!(!src.path().join("nested").exists());
}

#[test]
fn skip_policy_is_a_no_op_on_existing_files() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("src");
    src.child("f.txt").write_str("new")?;
    let dst = temp.child("dst");
    dst.child("f.txt").write_str("old")?;
    let old_time = FileTime::from_unix_time(1_500_000_000, 0);
    set_file_mtime(dst.child("f.txt").path(), old_time)?;

    let report = copy(src.path(), dst.path(), OverwriteOption::Skip)?;

    assert_eq!(report.entries_skipped, 1);
    assert_eq!(report.files_copied, 0);
    assert_eq!(fs::read_to_string(dst.child("f.txt").path())?, "old");
    let mt = FileTime::from_last_modification_time(&fs::metadata(dst.child("f.txt").path())?);
    assert_eq!(mt, old_time);
    Ok(())
}

#[test]
fn overwrite_policy_replaces_everything() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("src.txt");
    src.write_str("fresh")?;
    let dst = temp.child("dst.txt");
    dst.write_str("stale and longer")?;
    // source older than destination: overwrite ignores times
    set_file_mtime(src.path(), FileTime::from_unix_time(1_000, 0))?;

    copy(src.path(), dst.path(), OverwriteOption::Overwrite)?;
    assert_eq!(fs::read_to_string(dst.path())?, "fresh");
    Ok(())
}

#[test]
fn update_if_newer_compares_strictly() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("src.txt");
    let dst = temp.child("dst.txt");
    src.write_str("source")?;
    dst.write_str("dest")?;

    let t = FileTime::from_unix_time(1_600_000_000, 0);
    set_file_mtime(src.path(), t)?;
    set_file_mtime(dst.path(), t)?;
    let report = copy(src.path(), dst.path(), OverwriteOption::UpdateIfNewer)?;
    assert_eq!(report.entries_skipped, 1);
    assert_eq!(fs::read_to_string(dst.path())?, "dest");

    set_file_mtime(src.path(), FileTime::from_unix_time(1_600_000_100, 0))?;
    let report = copy(src.path(), dst.path(), OverwriteOption::UpdateIfNewer)?;
    assert_eq!(report.files_copied, 1);
    assert_eq!(fs::read_to_string(dst.path())?, "source");

    // times were preserved, so an immediate second run is a no-op
    let report = copy(src.path(), dst.path(), OverwriteOption::UpdateIfNewer)?;
    assert_eq!(report.entries_skipped, 1);
    Ok(())
}

#[test]
fn file_over_directory_with_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("f");
    src.write_str("file")?;
    let dst = temp.child("occupied");
    dst.child("inner/x").write_str("x")?;

    copy(src.path(), dst.path(), OverwriteOption::Overwrite)?;
    assert_eq!(fs::read_to_string(dst.path())?, "file");
    Ok(())
}

#[test]
fn directory_over_file_is_not_a_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("tree");
    src.child("f").write_str("x").unwrap();
    let dst = temp.child("plain");
    dst.write_str("p").unwrap();
    let err = copy(src.path(), dst.path(), OverwriteOption::Overwrite).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::NotADirectory);
}

#[test]
fn dot_segments_are_normalized() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("rel/./src.txt");
    src.write_str("r")?;
    let dst = temp.path().join("rel/sub/../dst.txt");
    copy(src.path(), &dst, OverwriteOption::Skip)?;
    assert_eq!(fs::read_to_string(temp.path().join("rel/dst.txt"))?, "r");
    Ok(())
}

#[test]
fn copy_onto_itself_keeps_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("self.txt");
    f.write_str("precious")?;

    for policy in [OverwriteOption::Overwrite, OverwriteOption::UpdateIfNewer] {
        let report = copy(f.path(), f.path(), policy)?;
        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.files_copied, 0);
    }
    // a different spelling of the same entry
    let alias = temp.path().join("sub/../self.txt");
    temp.child("sub").create_dir_all()?;
    copy(f.path(), &alias, OverwriteOption::Overwrite)?;

    assert_eq!(fs::read_to_string(f.path())?, "precious");
    Ok(())
}

#[test]
fn existing_link_in_destination_tree_is_not_followed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("src");
    src.child("sub/f.txt").write_str("payload")?;
    let outside = temp.child("outside");
    outside.create_dir_all()?;
    let dst = temp.child("dst");
    dst.create_dir_all()?;
    symlink(outside.path(), dst.child("sub").path())?;

    let err = copy(src.path(), dst.path(), OverwriteOption::Overwrite).unwrap_err();

    assert_eq!(err.kind(), FsErrorKind::NotADirectory);
    assert!(!outside.child("f.txt").path().exists());
    assert!(fs::symlink_metadata(dst.child("sub").path())?.file_type().is_symlink());
    Ok(())
}
