//! Core library for `treeops`.
//!
//! A symlink-aware recursive filesystem engine: copy, move and remove of
//! files, directories and symbolic links under an overwrite policy, with
//! platform-safe long paths. Links are never dereferenced during traversal.
//!
//! Module map:
//! - `fs_ops`: path resolution, classification, policy, single-entry transfer,
//!   tree walking and the whole-tree engine.
//! - `platform`: OS-specific link capability, access checks, secure file creation.
//! - `config`: XML config and default paths (used by the binary).
//! - `errors`: the typed `FsError`.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;

pub use config::{
    Config, LogLevel, default_config_path, default_log_path, load_config_from_xml_path,
    path_has_symlink_ancestor,
};
pub use errors::{FsError, FsErrorKind, FsResult};
pub use fs_ops::{
    DirectoryEntry, EntryKind, FileStream, OverwriteOption, PlatformPath, TransferDecision,
    TransferReport, TreeWalker, copy, from_platform_safe, move_path, remove, to_platform_safe,
};
