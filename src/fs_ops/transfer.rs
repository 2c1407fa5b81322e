//! Single-entry operations: copy or move one file or link, create one
//! directory, remove one entry (recursively for a real directory).
//!
//! Paths are used as given; the engine hands in platform-safe forms.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{FsError, FsResult};
use crate::platform;

use super::classify::{EntryKind, classify, exists, is_directory, is_same_entry, modified_time};
use super::helpers::{os_call, os_error};
use super::io_copy::copy_file_contents;
use super::metadata::{preserve_file_metadata, preserve_link_times};
use super::policy::{OverwriteOption, TransferDecision, decide};
use super::resolve::is_root_path;

fn reject_root(path: &Path) -> FsResult<()> {
    if is_root_path(path) {
        return Err(FsError::RootPathViolation(path.to_path_buf()));
    }
    Ok(())
}

/// Resolve an existing destination against the policy, clearing it on Proceed.
/// An absent destination gets its parent directory created.
fn prepare_destination(
    source: &Path,
    destination: &Path,
    policy: OverwriteOption,
) -> FsResult<TransferDecision> {
    if !exists(destination)? {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_directory(parent)?;
        }
        return Ok(TransferDecision::Proceed);
    }
    // Clearing the destination would delete the source itself.
    if is_same_entry(source, destination)? {
        debug!(src = %source.display(), dst = %destination.display(), "source and destination are the same entry");
        return Ok(TransferDecision::Skip);
    }
    let decision = decide(true, policy, modified_time(source)?, modified_time(destination)?);
    debug!(src = %source.display(), dst = %destination.display(), policy = %policy, ?decision, "destination exists");
    if decision == TransferDecision::Proceed {
        remove(destination)?;
    }
    Ok(decision)
}

/// Copy one regular file or symbolic link. Links are recreated with the same
/// target text and never dereferenced; directories are rejected.
pub fn copy_entry(
    source: &Path,
    destination: &Path,
    policy: OverwriteOption,
) -> FsResult<TransferDecision> {
    reject_root(destination)?;
    let kind = classify(source)?;
    if kind.is_dir() {
        return Err(FsError::IsADirectory(source.to_path_buf()));
    }
    if prepare_destination(source, destination, policy)? == TransferDecision::Skip {
        return Ok(TransferDecision::Skip);
    }

    match kind {
        EntryKind::SymbolicLink { points_to_directory } => {
            let target = platform::read_link_target(source)?;
            platform::create_symlink(destination, &target, points_to_directory)
                .map_err(os_error("create symlink", destination))?;
            let meta = fs::symlink_metadata(source).map_err(os_error("lstat", source))?;
            preserve_link_times(destination, &meta);
            debug!(src = %source.display(), dst = %destination.display(), target = %target.display(), "recreated symlink");
        }
        _ => {
            let meta = fs::metadata(source).map_err(os_error("stat", source))?;
            let bytes = copy_file_contents(source, destination)?;
            preserve_file_metadata(source, destination, &meta);
            debug!(src = %source.display(), dst = %destination.display(), bytes, "copied file");
        }
    }
    Ok(TransferDecision::Proceed)
}

/// Move one entry by rename. Same decision structure as [`copy_entry`]; a
/// rename across volumes fails with the OS error and is not emulated.
pub fn move_entry(
    source: &Path,
    destination: &Path,
    policy: OverwriteOption,
) -> FsResult<TransferDecision> {
    reject_root(destination)?;
    if !exists(source)? {
        return Err(FsError::NotFound(source.to_path_buf()));
    }
    if prepare_destination(source, destination, policy)? == TransferDecision::Skip {
        return Ok(TransferDecision::Skip);
    }
    fs::rename(source, destination).map_err(os_error("rename", source))?;
    debug!(src = %source.display(), dst = %destination.display(), "renamed");
    Ok(TransferDecision::Proceed)
}

/// Remove `path` and everything below it, never following links. Returns the
/// number of entries removed; an absent path removes nothing and succeeds.
pub fn remove(path: &Path) -> FsResult<u64> {
    reject_root(path)?;
    if !exists(path)? {
        return Ok(0);
    }
    let count = remove_tree(path)?;
    if count == 0 {
        return Err(os_call("remove", path, io::Error::other("entry exists but nothing was removed")));
    }
    debug!(path = %path.display(), count, "removed");
    Ok(count)
}

fn remove_tree(path: &Path) -> FsResult<u64> {
    let meta = fs::symlink_metadata(path).map_err(os_error("lstat", path))?;
    let ft = meta.file_type();
    if ft.is_symlink() {
        // junctions included: the entry's own flag picks remove_dir vs remove_file
        platform::remove_symlink(path, platform::link_entry_is_dir(&meta))
            .map_err(os_error("remove symlink", path))?;
        return Ok(1);
    }
    if !ft.is_dir() {
        fs::remove_file(path).map_err(os_error("remove file", path))?;
        return Ok(1);
    }
    let mut count = 0;
    for child in fs::read_dir(path).map_err(os_error("read directory", path))? {
        let child = child.map_err(os_error("read directory", path))?;
        count += remove_tree(&child.path())?;
    }
    fs::remove_dir(path).map_err(os_error("remove directory", path))?;
    Ok(count + 1)
}

/// Make sure a directory exists at `path`. Returns `true` if it had to be created.
pub fn ensure_directory(path: &Path) -> FsResult<bool> {
    if is_directory(path)? {
        return Ok(false);
    }
    if exists(path)? {
        return Err(FsError::NotADirectory(path.to_path_buf()));
    }
    fs::create_dir_all(path).map_err(os_error("create directory", path))?;
    Ok(true)
}

/// Link-preserving [`ensure_directory`] for paths produced by tree replay.
/// Anything but a real directory at `path`, a symbolic link included, is
/// `NotADirectory`; nothing is ever written through a link.
pub fn ensure_real_directory(path: &Path) -> FsResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_dir() => Ok(false),
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(os_error("create directory", path))?;
            Ok(true)
        }
        Err(e) => Err(os_call("lstat", path, e)),
    }
}

/// Create exactly one directory; the parent must exist and `path` must not.
pub fn create_directory(path: &Path) -> FsResult<()> {
    fs::create_dir(path).map_err(os_error("create directory", path))
}

/// Create `path` and any missing parents; fails if `path` already exists.
pub fn create_directory_recursively(path: &Path) -> FsResult<()> {
    if exists(path)? {
        return Err(os_call(
            "create directory",
            path,
            io::Error::from(io::ErrorKind::AlreadyExists),
        ));
    }
    fs::create_dir_all(path).map_err(os_error("create directory", path))
}

pub fn current_path() -> FsResult<PathBuf> {
    std::env::current_dir().map_err(os_error("get current directory", Path::new(".")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::FsErrorKind;
    use filetime::{FileTime, set_file_mtime};
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn copy_file_into_missing_parent() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        fs::write(&src, b"alpha").unwrap();
        let dst = td.path().join("x/y/a.txt");
        assert_eq!(copy_entry(&src, &dst, OverwriteOption::Skip).unwrap(), TransferDecision::Proceed);
        assert_eq!(fs::read(&dst).unwrap(), b"alpha");
    }

    #[test]
    fn copy_entry_rejects_directories() {
        let td = tempdir().unwrap();
        let err = copy_entry(td.path(), &td.path().join("out"), OverwriteOption::Overwrite).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::IsADirectory);
    }

    #[test]
    fn copy_link_keeps_target_text() {
        let td = tempdir().unwrap();
        fs::create_dir(td.path().join("sub")).unwrap();
        let link = td.path().join("link");
        symlink("sub", &link).unwrap();
        let dst = td.path().join("copy_of_link");
        copy_entry(&link, &dst, OverwriteOption::Skip).unwrap();
        assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&dst).unwrap(), PathBuf::from("sub"));
    }

    #[test]
    fn skip_leaves_destination_untouched() {
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();
        set_file_mtime(&dst, FileTime::from_unix_time(1_000, 0)).unwrap();

        assert_eq!(copy_entry(&src, &dst, OverwriteOption::Skip).unwrap(), TransferDecision::Skip);
        assert_eq!(move_entry(&src, &dst, OverwriteOption::Skip).unwrap(), TransferDecision::Skip);
        assert_eq!(fs::read(&dst).unwrap(), b"old");
        assert!(src.exists());
        let mt = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(mt, FileTime::from_unix_time(1_000, 0));
    }

    #[test]
    fn move_replaces_with_overwrite() {
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::write(&src, b"new").unwrap();
        fs::create_dir_all(dst.join("nested")).unwrap();

        move_entry(&src, &dst, OverwriteOption::Overwrite).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn move_missing_source_is_not_found() {
        let td = tempdir().unwrap();
        let err = move_entry(&td.path().join("nope"), &td.path().join("d"), OverwriteOption::Overwrite).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn remove_counts_and_is_idempotent() {
        let td = tempdir().unwrap();
        let root = td.path().join("tree");
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/f"), b"f").unwrap();
        fs::write(root.join("g"), b"g").unwrap();
        // link to something outside the tree: removed, target survives
        let outside = td.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep"), b"k").unwrap();
        symlink(&outside, root.join("l")).unwrap();

        assert_eq!(remove(&root).unwrap(), 6);
        assert!(!root.exists());
        assert!(outside.join("keep").exists());
        assert_eq!(remove(&root).unwrap(), 0);
    }

    #[test]
    fn remove_root_is_rejected() {
        assert_eq!(remove(Path::new("/")).unwrap_err().kind(), FsErrorKind::RootPathViolation);
    }

    #[test]
    fn directory_creation_rules() {
        let td = tempdir().unwrap();
        let d = td.path().join("d");
        create_directory(&d).unwrap();
        assert_eq!(create_directory(&d).unwrap_err().kind(), FsErrorKind::OsCallFailure);
        assert_eq!(create_directory_recursively(&d).unwrap_err().kind(), FsErrorKind::OsCallFailure);
        assert_eq!(
            create_directory(&td.path().join("no/parent")).unwrap_err().kind(),
            FsErrorKind::OsCallFailure
        );
        create_directory_recursively(&td.path().join("p/q/r")).unwrap();

        assert!(!ensure_directory(&d).unwrap());
        assert!(ensure_directory(&td.path().join("fresh/one")).unwrap());
        let f = td.path().join("file");
        fs::write(&f, b"x").unwrap();
        assert_eq!(ensure_directory(&f).unwrap_err().kind(), FsErrorKind::NotADirectory);
        assert!(current_path().unwrap().is_absolute());
    }

    #[test]
    fn replayed_directory_never_goes_through_a_link() {
        let td = tempdir().unwrap();
        let outside = td.path().join("outside");
        fs::create_dir(&outside).unwrap();
        let link = td.path().join("sub");
        symlink(&outside, &link).unwrap();

        // the following variant accepts the link, the replay variant does not
        assert!(!ensure_directory(&link).unwrap());
        assert_eq!(ensure_real_directory(&link).unwrap_err().kind(), FsErrorKind::NotADirectory);
        assert!(ensure_real_directory(&td.path().join("new/dir")).unwrap());
        assert!(!ensure_real_directory(&td.path().join("new/dir")).unwrap());
    }

    #[test]
    fn same_entry_is_skipped_under_every_policy() {
        let td = tempdir().unwrap();
        let f = td.path().join("f");
        fs::write(&f, b"keep").unwrap();
        let alias = td.path().join("x/../f");
        fs::create_dir(td.path().join("x")).unwrap();

        for policy in [OverwriteOption::Overwrite, OverwriteOption::UpdateIfNewer, OverwriteOption::Skip] {
            assert_eq!(copy_entry(&f, &f, policy).unwrap(), TransferDecision::Skip);
            assert_eq!(move_entry(&f, &alias, policy).unwrap(), TransferDecision::Skip);
        }
        assert_eq!(fs::read(&f).unwrap(), b"keep");
    }
}
