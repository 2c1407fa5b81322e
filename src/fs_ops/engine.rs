//! Whole-tree operations.
//!
//! The source is classified once. Files and links go straight to the
//! single-entry transfer; a directory source is replayed entry by entry:
//! every descendant's path relative to the source is joined onto the
//! destination. Failures abort immediately and are wrapped with the
//! operation name and both paths.
//!
//! Only the destination root given by the caller may be a link to a
//! directory; a link met at a replayed directory path is `NotADirectory`.

use std::path::Path;
use tracing::{debug, info};

use crate::errors::{FsError, FsErrorKind, FsResult};

use super::classify::{EntryKind, classify};
use super::policy::{OverwriteOption, TransferDecision};
use super::resolve::{PlatformPath, is_root_path, is_within, relative_to, to_platform_safe};
use super::transfer::{copy_entry, ensure_directory, ensure_real_directory, move_entry};
use super::walker::TreeWalker;

/// Counters for one engine call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub files_copied: u64,
    pub links_created: u64,
    pub dirs_created: u64,
    pub entries_moved: u64,
    pub entries_skipped: u64,
    pub entries_removed: u64,
}

impl TransferReport {
    fn record_copy(&mut self, kind: EntryKind, decision: TransferDecision) {
        match (decision, kind) {
            (TransferDecision::Skip, _) => self.entries_skipped += 1,
            (TransferDecision::Proceed, EntryKind::SymbolicLink { .. }) => self.links_created += 1,
            (TransferDecision::Proceed, _) => self.files_copied += 1,
        }
    }
}

/// Classify an existing source; a missing one is reported under the caller's spelling.
fn classify_source(original: &Path, source: &PlatformPath) -> FsResult<EntryKind> {
    classify(source.as_path()).map_err(|e| match e.kind() {
        FsErrorKind::NotFound => FsError::NotFound(original.to_path_buf()),
        _ => e,
    })
}

fn reject_root_destination(original: &Path, destination: &PlatformPath) -> FsResult<()> {
    if is_root_path(destination.as_path()) {
        return Err(FsError::RootPathViolation(original.to_path_buf()));
    }
    Ok(())
}

fn reject_nested_destination(source: &PlatformPath, destination: &PlatformPath) -> FsResult<()> {
    if is_within(destination.as_path(), source.as_path()) {
        return Err(FsError::DestinationInsideSource {
            src: source.as_path().to_path_buf(),
            dst: destination.as_path().to_path_buf(),
        });
    }
    Ok(())
}

/// Copy a file, a link or a whole directory tree.
pub fn copy(source: &Path, destination: &Path, policy: OverwriteOption) -> FsResult<TransferReport> {
    let report = copy_inner(source, destination, policy)
        .map_err(|e| e.context("copy", source, Some(destination.to_path_buf())))?;
    info!(
        src = %source.display(),
        dst = %destination.display(),
        policy = %policy,
        files = report.files_copied,
        links = report.links_created,
        dirs = report.dirs_created,
        skipped = report.entries_skipped,
        "copy finished"
    );
    Ok(report)
}

fn copy_inner(source: &Path, destination: &Path, policy: OverwriteOption) -> FsResult<TransferReport> {
    let src = to_platform_safe(source)?;
    let dst = to_platform_safe(destination)?;
    let kind = classify_source(source, &src)?;
    reject_root_destination(destination, &dst)?;

    let mut report = TransferReport::default();
    if !kind.is_dir() {
        let decision = copy_entry(src.as_path(), dst.as_path(), policy)?;
        report.record_copy(kind, decision);
        return Ok(report);
    }

    reject_nested_destination(&src, &dst)?;
    if ensure_directory(dst.as_path())? {
        report.dirs_created += 1;
    }
    for entry in TreeWalker::recursive(src.as_path()) {
        let entry = entry?;
        let Some(rel) = relative_to(&entry.path, src.as_path()) else {
            continue;
        };
        let target = dst.as_path().join(&rel);
        debug!(path = %entry.path.display(), kind = entry.kind.as_str(), target = %target.display(), "copy entry");
        if entry.kind.is_dir() {
            if ensure_real_directory(&target)? {
                report.dirs_created += 1;
            }
        } else {
            let decision = copy_entry(&entry.path, &target, policy)?;
            report.record_copy(entry.kind, decision);
        }
    }
    Ok(report)
}

/// Move by a single rename of the top-level entry. An existing destination is
/// resolved by the policy using the two top-level timestamps.
pub fn move_path(source: &Path, destination: &Path, policy: OverwriteOption) -> FsResult<TransferReport> {
    let report = move_inner(source, destination, policy)
        .map_err(|e| e.context("move", source, Some(destination.to_path_buf())))?;
    info!(
        src = %source.display(),
        dst = %destination.display(),
        policy = %policy,
        moved = report.entries_moved,
        skipped = report.entries_skipped,
        "move finished"
    );
    Ok(report)
}

fn move_inner(source: &Path, destination: &Path, policy: OverwriteOption) -> FsResult<TransferReport> {
    let src = to_platform_safe(source)?;
    let dst = to_platform_safe(destination)?;
    let kind = classify_source(source, &src)?;
    reject_root_destination(destination, &dst)?;
    if kind.is_dir() {
        reject_nested_destination(&src, &dst)?;
    }

    let mut report = TransferReport::default();
    match move_entry(src.as_path(), dst.as_path(), policy)? {
        TransferDecision::Proceed => report.entries_moved += 1,
        TransferDecision::Skip => report.entries_skipped += 1,
    }
    Ok(report)
}

/// Remove an entry and everything below it. Removing something absent is a no-op.
pub fn remove(path: &Path) -> FsResult<TransferReport> {
    let report = remove_inner(path).map_err(|e| e.context("remove", path, None))?;
    info!(path = %path.display(), removed = report.entries_removed, "remove finished");
    Ok(report)
}

fn remove_inner(path: &Path) -> FsResult<TransferReport> {
    let target = to_platform_safe(path)?;
    if is_root_path(target.as_path()) {
        return Err(FsError::RootPathViolation(path.to_path_buf()));
    }
    let removed = super::transfer::remove(target.as_path())?;
    Ok(TransferReport {
        entries_removed: removed,
        ..TransferReport::default()
    })
}
