//! Windows implementations of platform helpers.
//!
//! Notes:
//! - Link detection opens the entry itself (`FILE_FLAG_OPEN_REPARSE_POINT`) and
//!   reads its reparse tag; the handle is a `File` and closes on drop.
//! - Link targets come from `FSCTL_GET_REPARSE_POINT`, decoded by `fs_ops::reparse`.
//! - No ACL management; POSIX modes are no-ops.

use anyhow::{Result, bail};
use std::ffi::c_void;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::mem::{size_of, zeroed};
use std::os::windows::fs::{MetadataExt, OpenOptionsExt};
use std::os::windows::io::AsRawHandle;
use std::path::{Path, PathBuf};

use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_TAG_INFO, FILE_FLAG_BACKUP_SEMANTICS,
    FILE_FLAG_OPEN_REPARSE_POINT, FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE,
    FileAttributeTagInfo, GetFileInformationByHandleEx,
};
use windows_sys::Win32::System::IO::DeviceIoControl;
use windows_sys::Win32::System::Ioctl::FSCTL_GET_REPARSE_POINT;

use super::temp::tmp_config_sibling_name;
use crate::errors::FsResult;
use crate::fs_ops::helpers::os_error;
use crate::fs_ops::reparse::{IO_REPARSE_TAG_SYMLINK, parse_symlink_reparse_buffer};
use crate::fs_ops::resolve::strip_platform_prefix;

const MAX_REPARSE_BUFFER: usize = 16 * 1024;

/// Open the entry itself, not what it points at. Zero access rights are
/// enough for attribute queries and `FSCTL_GET_REPARSE_POINT`.
fn open_reparse_point(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .access_mode(0)
        .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE)
        .custom_flags(FILE_FLAG_OPEN_REPARSE_POINT | FILE_FLAG_BACKUP_SEMANTICS)
        .open(path)
}

fn handle(file: &File) -> HANDLE {
    file.as_raw_handle() as HANDLE
}

pub fn is_link(path: &Path) -> FsResult<bool> {
    let file = open_reparse_point(path).map_err(os_error("open reparse point", path))?;
    // SAFETY: zeroed FILE_ATTRIBUTE_TAG_INFO is a valid plain-data value.
    let mut info: FILE_ATTRIBUTE_TAG_INFO = unsafe { zeroed() };
    // SAFETY: the handle is valid while `file` lives; the buffer size matches the struct.
    let ok = unsafe {
        GetFileInformationByHandleEx(
            handle(&file),
            FileAttributeTagInfo,
            &mut info as *mut _ as *mut c_void,
            size_of::<FILE_ATTRIBUTE_TAG_INFO>() as u32,
        )
    };
    if ok == 0 {
        return Err(os_error("query reparse tag", path)(io::Error::last_os_error()));
    }
    Ok(info.ReparseTag == IO_REPARSE_TAG_SYMLINK)
}

/// Directory flavour of a link is the link's own attribute bit; the target
/// is never consulted.
pub fn is_link_to_directory(path: &Path) -> FsResult<bool> {
    if !is_link(path)? {
        return Ok(false);
    }
    let meta = fs::symlink_metadata(path).map_err(os_error("lstat", path))?;
    Ok(meta.file_attributes() & FILE_ATTRIBUTE_DIRECTORY != 0)
}

/// Target text recovered from the reparse buffer, with any NT `\??\` prefix removed.
pub fn read_link_target(path: &Path) -> FsResult<PathBuf> {
    let file = open_reparse_point(path).map_err(os_error("open reparse point", path))?;
    let mut buf = vec![0u8; MAX_REPARSE_BUFFER];
    let mut returned: u32 = 0;
    // SAFETY: output buffer and length describe `buf`; no input buffer; synchronous call.
    let ok = unsafe {
        DeviceIoControl(
            handle(&file),
            FSCTL_GET_REPARSE_POINT,
            std::ptr::null(),
            0,
            buf.as_mut_ptr() as *mut c_void,
            buf.len() as u32,
            &mut returned,
            std::ptr::null_mut(),
        )
    };
    if ok == 0 {
        return Err(os_error("read reparse point", path)(io::Error::last_os_error()));
    }
    buf.truncate(returned as usize);
    let data = parse_symlink_reparse_buffer(&buf)?;
    Ok(strip_platform_prefix(Path::new(&data.substitute_name)))
}

/// Windows links have a file or directory flavour fixed at creation.
pub fn create_symlink(link: &Path, target: &Path, target_is_dir: bool) -> io::Result<()> {
    if target_is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// A directory link is removed as a directory, which never touches its target.
pub fn remove_symlink(path: &Path, target_is_dir: bool) -> io::Result<()> {
    if target_is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Directory bit of the entry itself, from link-preserving metadata. True for
/// directory symlinks and for junctions, which `is_link` does not report.
pub fn link_entry_is_dir(meta: &fs::Metadata) -> bool {
    meta.file_attributes() & FILE_ATTRIBUTE_DIRECTORY != 0
}

pub fn is_readable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

pub fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

pub fn is_executable(path: &Path) -> bool {
    let executable_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "exe" | "bat" | "cmd" | "com"))
        .unwrap_or(false);
    executable_ext && fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Open log file for appending (no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Write a new config file via temp + rename. Fails if the target already exists.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent)?;

    let tmp = tmp_config_sibling_name(path);
    let mut f = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    f.write_all(contents)?;
    f.sync_all()?;
    drop(f);
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// No-op on Windows; POSIX-style directory modes are not applicable.
pub fn set_dir_mode_0700(_path: &Path) -> io::Result<()> {
    Ok(())
}
