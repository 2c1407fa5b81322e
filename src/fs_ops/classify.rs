//! Entry classification.
//!
//! - `classify` does one link-preserving stat; links get a second query for
//!   the directory flavour of their target.
//! - `is_directory`/`is_regular_file` follow links and report a clean
//!   "does not exist" as `Ok(false)`.
//! - `exists` never follows links, so a dangling link exists.

use filetime::FileTime;
use std::fs::{self, FileType};
use std::io;
use std::path::Path;

use crate::errors::{FsError, FsResult};
use crate::platform;

use super::helpers::os_call;

pub use crate::platform::{is_executable, is_readable, is_writable};

/// Kind of a filesystem entry as seen without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Directory,
    SymbolicLink { points_to_directory: bool },
}

impl EntryKind {
    /// A real directory, never a link to one.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::SymbolicLink { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::RegularFile => "file",
            EntryKind::Directory => "dir",
            EntryKind::SymbolicLink { points_to_directory: true } => "dir-symlink",
            EntryKind::SymbolicLink { points_to_directory: false } => "symlink",
        }
    }
}

fn is_absent(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}

pub fn is_symbolic_link(path: &Path) -> FsResult<bool> {
    platform::is_link(path)
}

/// False for anything that is not a link; callers check link-ness first.
pub fn is_symbolic_link_target_directory(path: &Path) -> FsResult<bool> {
    platform::is_link_to_directory(path)
}

pub fn is_directory(path: &Path) -> FsResult<bool> {
    match fs::metadata(path) {
        Ok(m) => Ok(m.is_dir()),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(os_call("stat", path, e)),
    }
}

pub fn is_regular_file(path: &Path) -> FsResult<bool> {
    match fs::metadata(path) {
        Ok(m) => Ok(m.is_file()),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(os_call("stat", path, e)),
    }
}

pub fn exists(path: &Path) -> FsResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(os_call("lstat", path, e)),
    }
}

/// Map an already-fetched, link-preserving file type to an [`EntryKind`].
pub(crate) fn kind_from_file_type(path: &Path, ft: FileType) -> FsResult<EntryKind> {
    if ft.is_symlink() {
        // Junctions and other name-surrogate reparse points are not symlinks here.
        #[cfg(windows)]
        {
            if !platform::is_link(path)? {
                return Err(FsError::UnknownEntryKind(path.to_path_buf()));
            }
        }
        return Ok(EntryKind::SymbolicLink {
            points_to_directory: platform::is_link_to_directory(path)?,
        });
    }
    if ft.is_dir() {
        Ok(EntryKind::Directory)
    } else if ft.is_file() {
        Ok(EntryKind::RegularFile)
    } else {
        Err(FsError::UnknownEntryKind(path.to_path_buf()))
    }
}

/// Classify `path` without following it. A missing entry is `NotFound`.
pub fn classify(path: &Path) -> FsResult<EntryKind> {
    let meta = fs::symlink_metadata(path).map_err(|e| {
        if is_absent(&e) {
            FsError::NotFound(path.to_path_buf())
        } else {
            os_call("lstat", path, e)
        }
    })?;
    kind_from_file_type(path, meta.file_type())
}

fn lstat_if_present(path: &Path) -> FsResult<Option<fs::Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(m) => Ok(Some(m)),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(os_call("lstat", path, e)),
    }
}

#[cfg(unix)]
fn same_identity(_a: &Path, ma: &fs::Metadata, _b: &Path, mb: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    ma.dev() == mb.dev() && ma.ino() == mb.ino()
}

/// No stable file index in std here: compare the canonical parent plus the
/// entry's own name, ignoring case.
#[cfg(windows)]
fn same_identity(a: &Path, _ma: &fs::Metadata, b: &Path, _mb: &fs::Metadata) -> bool {
    fn identity(p: &Path) -> String {
        let parent = p.parent().filter(|d| !d.as_os_str().is_empty());
        let joined = match (parent, p.file_name()) {
            (Some(dir), Some(name)) => dunce::canonicalize(dir)
                .unwrap_or_else(|_| dir.to_path_buf())
                .join(name),
            _ => dunce::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()),
        };
        dunce::simplified(&joined).to_string_lossy().to_lowercase()
    }
    identity(a) == identity(b)
}

/// True when both paths name one existing directory entry. The last
/// component is never followed, so a link and its target are different
/// entries; two hard links to one file are the same entry.
pub fn is_same_entry(a: &Path, b: &Path) -> FsResult<bool> {
    let (Some(ma), Some(mb)) = (lstat_if_present(a)?, lstat_if_present(b)?) else {
        return Ok(false);
    };
    Ok(same_identity(a, &ma, b, &mb))
}

/// Modification time of the entry itself (a link's own mtime, not its target's).
pub fn modified_time(path: &Path) -> FsResult<FileTime> {
    let meta = fs::symlink_metadata(path).map_err(|e| os_call("lstat", path, e))?;
    Ok(FileTime::from_last_modification_time(&meta))
}
