//! Lazy depth-first directory traversal that never follows links.
//!
//! Wraps `walkdir` with `follow_links(false)`: a directory symlink is yielded as
//! a leaf and never descended into. Entries come sorted by file name within
//! each directory, a directory before its contents; the root is not yielded.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{FsError, FsResult};

use super::classify::{EntryKind, is_directory, kind_from_file_type};
use super::helpers::os_call;

/// One entry produced by [`TreeWalker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    /// 1 for immediate children of the root.
    pub depth: usize,
    pub kind: EntryKind,
}

pub struct TreeWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
    checked_root: bool,
    done: bool,
}

impl TreeWalker {
    /// Immediate children of `root` only.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::build(root.as_ref(), false)
    }

    /// Every descendant of `root`.
    pub fn recursive(root: impl AsRef<Path>) -> Self {
        Self::build(root.as_ref(), true)
    }

    fn build(root: &Path, recursive: bool) -> Self {
        let mut walk = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();
        if !recursive {
            walk = walk.max_depth(1);
        }
        Self {
            root: root.to_path_buf(),
            inner: walk.into_iter(),
            checked_root: false,
            done: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_root(&self) -> FsResult<()> {
        if is_directory(&self.root)? {
            return Ok(());
        }
        if super::classify::exists(&self.root)? {
            Err(FsError::NotADirectory(self.root.clone()))
        } else {
            Err(FsError::NotFound(self.root.clone()))
        }
    }

    fn convert_error(&self, err: walkdir::Error) -> FsError {
        let path = err.path().unwrap_or(&self.root).to_path_buf();
        match err.into_io_error() {
            Some(io_err) => os_call("read directory", &path, io_err),
            None => os_call(
                "read directory",
                &path,
                io::Error::other("filesystem loop detected"),
            ),
        }
    }
}

impl Iterator for TreeWalker {
    type Item = FsResult<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.checked_root {
            self.checked_root = true;
            if let Err(e) = self.check_root() {
                self.done = true;
                return Some(Err(e));
            }
        }
        let item = match self.inner.next()? {
            Ok(entry) => kind_from_file_type(entry.path(), entry.file_type()).map(|kind| DirectoryEntry {
                depth: entry.depth(),
                path: entry.into_path(),
                kind,
            }),
            Err(e) => Err(self.convert_error(e)),
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
