//! Metadata preservation for copied entries.
//! - Regular files: atime/mtime, permission bits (readonly attribute on Windows)
//!   and, with the `xattrs` feature, extended attributes.
//! - Symbolic links: the link's own atime/mtime.
//! - Best-effort: failures are logged with `warn!` and never abort the copy.

use filetime::{FileTime, set_file_times, set_symlink_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

fn times_of(meta: &fs::Metadata) -> (FileTime, FileTime) {
    (
        FileTime::from_last_access_time(meta),
        FileTime::from_last_modification_time(meta),
    )
}

/// Copy times, permissions and xattrs from `src` onto the regular file `dest`.
/// `src_meta` is the source's metadata, fetched once by the caller.
pub(crate) fn preserve_file_metadata(src: &Path, dest: &Path, src_meta: &fs::Metadata) {
    // xattrs need write access; times go last so nothing bumps them afterwards.
    preserve_xattrs(src, dest);
    preserve_permissions(dest, src_meta);

    let (at, mt) = times_of(src_meta);
    match set_file_times(dest, at, mt) {
        Ok(()) => trace!(path = %dest.display(), "set atime/mtime on destination"),
        Err(e) => warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination"),
    }
}

/// Copy the link's own times onto a freshly created link.
pub(crate) fn preserve_link_times(dest_link: &Path, src_meta: &fs::Metadata) {
    let (at, mt) = times_of(src_meta);
    if let Err(e) = set_symlink_file_times(dest_link, at, mt) {
        warn!(path = %dest_link.display(), error = %e, "failed to set symlink times on destination");
    }
}

fn preserve_permissions(dest: &Path, src_meta: &fs::Metadata) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o7777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(src_mode)) {
            warn!(path = %dest.display(), mode = format!("{:o}", src_mode), error = %e, "failed to set permissions on destination");
        } else {
            trace!(path = %dest.display(), mode = format!("{:o}", src_mode), "set permissions on destination");
        }
    }
    #[cfg(not(unix))]
    {
        let ro = src_meta.permissions().readonly();
        match fs::metadata(dest) {
            Ok(meta) => {
                let mut perms = meta.permissions();
                perms.set_readonly(ro);
                if let Err(e) = fs::set_permissions(dest, perms) {
                    warn!(path = %dest.display(), readonly = ro, error = %e, "failed to set readonly attribute on destination");
                }
            }
            Err(e) => {
                warn!(path = %dest.display(), error = %e, "failed to stat destination for readonly preservation");
            }
        }
    }
}

#[cfg(feature = "xattrs")]
fn preserve_xattrs(src: &Path, dest: &Path) {
    let names = match xattr::list(src) {
        Ok(names) => names,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            return;
        }
    };
    for name in names {
        let name_disp = name.to_string_lossy().into_owned();
        match xattr::get(src, &name) {
            Ok(value) => {
                let value = value.unwrap_or_default();
                if let Err(e) = xattr::set(dest, &name, &value) {
                    warn!(dest = %dest.display(), xattr = %name_disp, error = %e, "failed to set xattr on destination");
                } else {
                    trace!(dest = %dest.display(), xattr = %name_disp, size = value.len(), "preserved xattr");
                }
            }
            Err(e) => {
                warn!(src = %src.display(), xattr = %name_disp, error = %e, "failed to read xattr value from source");
            }
        }
    }
}

#[cfg(not(feature = "xattrs"))]
fn preserve_xattrs(_src: &Path, _dest: &Path) {}
