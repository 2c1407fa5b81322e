//! I/O error adapters.
//!
//! Converts `io::Error` into `FsError::OsCall`, keeping the raw OS code and
//! appending a platform-aware hint to the message.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(os_error("create directory", dir))?;

use std::io;
use std::path::Path;

use crate::errors::FsError;

/// Hint for a raw OS error code, if we know a useful one.
fn hint_for_code(code: i32) -> Option<&'static str> {
    #[cfg(unix)]
    {
        let hint = match code {
            libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
            libc::EXDEV => "cross-filesystem; rename cannot move entries between volumes",
            libc::EBUSY => "resource busy; ensure no other process is using it",
            libc::ENOENT => "path not found; verify it exists",
            libc::EEXIST => "already exists; remove the target first",
            libc::ENOTEMPTY => "directory not empty",
            libc::ENOTDIR => "a path component is not a directory",
            libc::EISDIR => "target is a directory",
            libc::ENOSPC => "insufficient space on device",
            libc::EROFS => "read-only filesystem; cannot write here",
            libc::ELOOP => "too many symbolic link levels (ELOOP); possible symlink cycle",
            libc::ENAMETOOLONG => "filename or path too long; shorten path segments",
            libc::EMFILE => "process file descriptor limit reached",
            libc::ENFILE => "system-wide file table overflow",
            libc::EINVAL => "invalid argument (moving a directory into itself?)",
            _ => return None,
        };
        Some(hint)
    }
    #[cfg(windows)]
    {
        let hint = match code {
            5 => "access denied; check permissions",                 // ERROR_ACCESS_DENIED
            17 => "not same device; rename cannot cross volumes",    // ERROR_NOT_SAME_DEVICE
            32 => "sharing violation; file is in use",               // ERROR_SHARING_VIOLATION
            2 | 3 => "path not found; verify it exists",             // FILE/PATH NOT FOUND
            80 | 183 => "already exists; remove the target first",   // ERROR_FILE_EXISTS / ALREADY_EXISTS
            112 => "insufficient disk space",                        // ERROR_DISK_FULL
            19 => "write protected / read-only media",               // ERROR_WRITE_PROTECT
            145 => "directory not empty",                            // ERROR_DIR_NOT_EMPTY
            206 => "filename or path too long",                      // ERROR_FILENAME_EXCED_RANGE
            1314 => "privilege not held; enable Developer Mode to create symlinks", // ERROR_PRIVILEGE_NOT_HELD
            4390 => "not a reparse point",                           // ERROR_NOT_A_REPARSE_POINT
            _ => return None,
        };
        Some(hint)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = code;
        None
    }
}

fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::AlreadyExists => Some("already exists; remove the target first"),
        io::ErrorKind::Unsupported => Some("operation not supported on this platform"),
        _ => None,
    }
}

/// Build "<op> '<path>': <err>[; hint] [os code: N]".
pub(crate) fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(hint) = hint_for_code(code) {
                msg.push_str("; ");
                msg.push_str(hint);
            }
            msg.push_str(&format!(" [os code: {code}]"));
        }
        None => {
            if let Some(hint) = hint_for_kind(e.kind()) {
                msg.push_str("; ");
                msg.push_str(hint);
            }
        }
    }
    msg
}

/// Convert one `io::Error` into `FsError::OsCall`.
pub(crate) fn os_call(op: &'static str, path: &Path, e: io::Error) -> FsError {
    FsError::OsCall {
        op,
        path: path.to_path_buf(),
        code: e.raw_os_error(),
        message: build_message(op, path, &e),
    }
}

/// Closure form of [`os_call`] for `.map_err(...)`.
pub fn os_error<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> FsError + 'a {
    move |e: io::Error| os_call(op, path, e)
}
