//! Typed error definitions for treeops.
//! Every engine operation returns `FsError`; the binary logs its stable
//! `code` and `kind` next to the message when a command fails.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`FsError`], independent of any context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    NotFound,
    NotADirectory,
    IsADirectory,
    PermissionDenied,
    RootPathViolation,
    OsCallFailure,
    UnknownEntryKind,
    DestinationInsideSource,
    StreamUnsupported,
    InvalidReparseData,
}

impl fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsErrorKind::NotFound => "not_found",
            FsErrorKind::NotADirectory => "not_a_directory",
            FsErrorKind::IsADirectory => "is_a_directory",
            FsErrorKind::PermissionDenied => "permission_denied",
            FsErrorKind::RootPathViolation => "root_path_violation",
            FsErrorKind::OsCallFailure => "os_call_failure",
            FsErrorKind::UnknownEntryKind => "unknown_entry_kind",
            FsErrorKind::DestinationInsideSource => "destination_inside_source",
            FsErrorKind::StreamUnsupported => "stream_unsupported",
            FsErrorKind::InvalidReparseData => "invalid_reparse_data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Is a directory: {0}")]
    IsADirectory(PathBuf),

    #[error("Permission denied on {path}: {context}")]
    PermissionDenied { path: PathBuf, context: String },

    #[error("Refusing to use the filesystem root as a destination: {0}")]
    RootPathViolation(PathBuf),

    /// A native call failed. `message` already carries the operation, path and hints.
    #[error("{message}")]
    OsCall {
        op: &'static str,
        path: PathBuf,
        code: Option<i32>,
        message: String,
    },

    /// Entry is neither a regular file, a directory nor a symbolic link.
    #[error("Unsupported entry kind (not a file, directory or symlink): {0}")]
    UnknownEntryKind(PathBuf),

    #[error("Destination '{dst}' lies inside source tree '{src}'")]
    DestinationInsideSource { src: PathBuf, dst: PathBuf },

    #[error("Stream for {path} does not support {op}")]
    StreamUnsupported { op: &'static str, path: PathBuf },

    #[error("Invalid reparse data: {0}")]
    InvalidReparseData(String),

    #[error("{op} '{}'{}: {source}", .src.display(), arrow(.dst))]
    Context {
        op: &'static str,
        src: PathBuf,
        dst: Option<PathBuf>,
        #[source]
        source: Box<FsError>,
    },
}

fn arrow(dst: &Option<PathBuf>) -> String {
    dst.as_ref()
        .map(|d| format!(" -> '{}'", d.display()))
        .unwrap_or_default()
}

pub type FsResult<T> = std::result::Result<T, FsError>;

impl FsError {
    /// Re-wrap this error with the operation and the paths it was acting on.
    pub fn context(self, op: &'static str, src: impl Into<PathBuf>, dst: Option<PathBuf>) -> Self {
        FsError::Context {
            op,
            src: src.into(),
            dst,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any number of `Context` layers.
    pub fn root_cause(&self) -> &FsError {
        let mut cur = self;
        while let FsError::Context { source, .. } = cur {
            cur = source;
        }
        cur
    }

    pub fn kind(&self) -> FsErrorKind {
        match self.root_cause() {
            FsError::NotFound(_) => FsErrorKind::NotFound,
            FsError::NotADirectory(_) => FsErrorKind::NotADirectory,
            FsError::IsADirectory(_) => FsErrorKind::IsADirectory,
            FsError::PermissionDenied { .. } => FsErrorKind::PermissionDenied,
            FsError::RootPathViolation(_) => FsErrorKind::RootPathViolation,
            FsError::OsCall { .. } => FsErrorKind::OsCallFailure,
            FsError::UnknownEntryKind(_) => FsErrorKind::UnknownEntryKind,
            FsError::DestinationInsideSource { .. } => FsErrorKind::DestinationInsideSource,
            FsError::StreamUnsupported { .. } => FsErrorKind::StreamUnsupported,
            FsError::InvalidReparseData(_) => FsErrorKind::InvalidReparseData,
            // root_cause never returns a Context
            FsError::Context { .. } => FsErrorKind::OsCallFailure,
        }
    }

    /// Stable numeric code for logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self.kind() {
            FsErrorKind::NotFound => 2,
            FsErrorKind::NotADirectory => 3,
            FsErrorKind::IsADirectory => 4,
            FsErrorKind::PermissionDenied => 5,
            FsErrorKind::RootPathViolation => 6,
            FsErrorKind::OsCallFailure => 7,
            FsErrorKind::UnknownEntryKind => 8,
            FsErrorKind::DestinationInsideSource => 9,
            FsErrorKind::StreamUnsupported => 10,
            FsErrorKind::InvalidReparseData => 11,
        }
    }

    /// Raw OS error code of the innermost failure, if it came from a native call.
    pub fn os_code(&self) -> Option<i32> {
        match self.root_cause() {
            FsError::OsCall { code, .. } => *code,
            _ => None,
        }
    }
}
