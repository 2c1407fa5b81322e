//! Path resolution helpers.
//!
//! - `to_platform_safe` makes a path absolute, folds `.`/`..` lexically and, on
//!   Windows, adds the `\\?\` extended-length marker so long paths work.
//! - `from_platform_safe` strips that marker again.
//! - Root detection, relative remainders and containment checks used by the engine.
//!
//! The marker handling is done on strings so it behaves identically (and is
//! testable) on every platform; only the decision to apply it is `cfg`-gated.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::errors::FsResult;

use super::helpers::os_error;

const VERBATIM: &str = r"\\?\";
const VERBATIM_UNC: &str = r"\\?\UNC\";
const NT_OBJECT: &str = r"\??\";

/// A path in the form handed to native calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformPath(PathBuf);

impl PlatformPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for PlatformPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Convert a logical path into the absolute, platform-safe form. Idempotent.
pub fn to_platform_safe(path: &Path) -> FsResult<PlatformPath> {
    if has_verbatim_prefix(&path.to_string_lossy()) {
        return Ok(PlatformPath(path.to_path_buf()));
    }
    let absolute = std::path::absolute(path).map_err(os_error("resolve absolute path", path))?;
    let normalized = normalize_lexically(&absolute);
    if cfg!(windows) {
        let prefixed = add_verbatim_prefix(&normalized.to_string_lossy());
        Ok(PlatformPath(PathBuf::from(prefixed)))
    } else {
        Ok(PlatformPath(normalized))
    }
}

/// Strip the extended-length marker, if present.
pub fn from_platform_safe(path: &PlatformPath) -> PathBuf {
    strip_platform_prefix(path.as_path())
}

/// Same as [`from_platform_safe`] for a path that did not come from this module
/// (directory listings, link targets).
pub fn strip_platform_prefix(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if has_verbatim_prefix(s) || s.starts_with(NT_OBJECT) => {
            PathBuf::from(strip_verbatim_prefix(s))
        }
        _ => path.to_path_buf(),
    }
}

fn has_verbatim_prefix(s: &str) -> bool {
    s.starts_with(VERBATIM)
}

/// `C:\a` -> `\\?\C:\a`, `\\srv\share\a` -> `\\?\UNC\srv\share\a`.
pub(crate) fn add_verbatim_prefix(s: &str) -> String {
    if has_verbatim_prefix(s) {
        return s.to_string();
    }
    let s = s.replace('/', "\\");
    match s.strip_prefix(r"\\") {
        Some(unc) => format!("{VERBATIM_UNC}{unc}"),
        None => format!("{VERBATIM}{s}"),
    }
}

/// Left inverse of [`add_verbatim_prefix`]; also accepts the NT `\??\` form
/// found in symlink reparse data.
pub(crate) fn strip_verbatim_prefix(s: &str) -> String {
    if let Some(unc) = s.strip_prefix(VERBATIM_UNC) {
        return format!(r"\\{unc}");
    }
    if let Some(rest) = s.strip_prefix(VERBATIM) {
        return rest.to_string();
    }
    if let Some(rest) = s.strip_prefix(NT_OBJECT) {
        return match rest.strip_prefix(r"UNC\") {
            Some(unc) => format!(r"\\{unc}"),
            None => rest.to_string(),
        };
    }
    s.to_string()
}

/// Fold `.` and `..` without touching the filesystem. `..` never climbs above
/// the root (or prefix) of an absolute path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// True when `path` resolves to a filesystem root (`/`, `C:\`, `\\?\C:\`, `\\srv\share`).
pub fn is_root_path(path: &Path) -> bool {
    let plain = strip_platform_prefix(path);
    let absolute = std::path::absolute(&plain).unwrap_or(plain);
    let normalized = normalize_lexically(&absolute);
    normalized.has_root() && normalized.parent().is_none()
}

/// "Remove base path": the remainder of `path` below `base`, if `path` lies under it.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(Path::to_path_buf)
}

/// True if `candidate` is `base` itself or lies below it. Both are
/// canonicalised when they exist; a missing candidate is resolved through its
/// nearest existing ancestor.
pub fn is_within(candidate: &Path, base: &Path) -> bool {
    let base_real = dunce::canonicalize(base).unwrap_or_else(|_| normalize_lexically(base));
    canonicalize_partial(candidate).starts_with(&base_real)
}

fn canonicalize_partial(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let normalized = normalize_lexically(&absolute);
    let mut tail: Vec<OsString> = Vec::new();
    let mut cur = normalized.as_path();
    loop {
        if let Ok(real) = dunce::canonicalize(cur) {
            let mut out = real;
            for part in tail.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (cur.parent(), cur.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                cur = parent;
            }
            _ => return normalized,
        }
    }
}
