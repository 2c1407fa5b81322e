//! Unix implementations of platform helpers (Linux, macOS, BSDs).
//!
//! Symbolic links are inspected with `lstat` and read with `readlink`; there
//! is no reparse data to parse here.

use super::common_unix::atomic_write_0600;
use anyhow::Result;
use std::ffi::CString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::errors::FsResult;
use crate::fs_ops::helpers::os_error;

/// Link-preserving check: `lstat` reports the link itself.
pub fn is_link(path: &Path) -> FsResult<bool> {
    let meta = fs::symlink_metadata(path).map_err(os_error("lstat", path))?;
    Ok(meta.file_type().is_symlink())
}

/// Unix links carry no directory bit of their own, so the target decides.
/// A dangling link is not a directory link.
pub fn is_link_to_directory(path: &Path) -> FsResult<bool> {
    if !is_link(path)? {
        return Ok(false);
    }
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) if e.raw_os_error() == Some(libc::ELOOP) => Ok(false),
        Err(e) => Err(os_error("stat link target", path)(e)),
    }
}

/// Raw target text of a link, exactly as stored.
pub fn read_link_target(path: &Path) -> FsResult<PathBuf> {
    fs::read_link(path).map_err(os_error("read symlink", path))
}

/// `target_is_dir` only matters on Windows.
pub fn create_symlink(link: &Path, target: &Path, _target_is_dir: bool) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

pub fn remove_symlink(path: &Path, _target_is_dir: bool) -> io::Result<()> {
    fs::remove_file(path)
}

/// Unix links have no directory flavour of their own.
pub fn link_entry_is_dir(_meta: &fs::Metadata) -> bool {
    false
}

fn access_ok(path: &Path, mode: libc::c_int) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

pub fn is_readable(path: &Path) -> bool {
    access_ok(path, libc::R_OK)
}

pub fn is_writable(path: &Path) -> bool {
    access_ok(path, libc::W_OK)
}

pub fn is_executable(path: &Path) -> bool {
    access_ok(path, libc::X_OK)
}

/// Open log file for appending; set 0600 only when creating a new file.
/// An existing file keeps its permissions (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Write config atomically: temp file (0600) + fsync + rename + fsync dir.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    atomic_write_0600(path, contents)
}

/// POSIX chmod 0700 for directories.
pub fn set_dir_mode_0700(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}
