//! Filesystem operations: modularized.
//!
//! Leaf-first: `resolve` (paths), `classify` (entry kinds), `policy`
//! (overwrite decisions), `stream`/`io_copy` (file bytes), `transfer`
//! (one entry), `walker` (traversal), `engine` (whole trees).

pub mod classify;
pub mod engine;
pub(crate) mod helpers;
mod io_copy;
mod metadata;
pub mod policy;
pub mod reparse;
pub mod resolve;
pub mod stream;
pub mod transfer;
pub mod walker;

pub use classify::{EntryKind, classify as classify_entry, exists};
pub use engine::{TransferReport, copy, move_path, remove};
pub use helpers::os_error;
pub use policy::{OverwriteOption, TransferDecision};
pub use resolve::{PlatformPath, from_platform_safe, to_platform_safe};
pub use stream::FileStream;
pub use walker::{DirectoryEntry, TreeWalker};
