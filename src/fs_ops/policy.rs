//! Overwrite policy and the per-entry transfer decision.

use filetime::FileTime;
use std::fmt;
use std::str::FromStr;

/// What to do when the destination of a copy or move already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteOption {
    /// Leave the destination untouched.
    #[default]
    Skip,
    /// Replace the destination.
    Overwrite,
    /// Replace only when the source was modified strictly later.
    UpdateIfNewer,
}

impl OverwriteOption {
    /// Case-insensitive parse of the accepted spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "overwrite" | "replace" => Some(Self::Overwrite),
            "update" | "update-if-newer" | "update_if_newer" | "newer" => Some(Self::UpdateIfNewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::UpdateIfNewer => "update",
        }
    }
}

impl fmt::Display for OverwriteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverwriteOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("invalid overwrite option '{s}' (expected skip, overwrite or update)")
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDecision {
    Proceed,
    Skip,
}

/// Decide whether a single transfer goes ahead.
///
/// `src_mtime`/`dst_mtime` are only consulted for `UpdateIfNewer`; equal
/// timestamps skip.
pub fn decide(
    destination_exists: bool,
    policy: OverwriteOption,
    src_mtime: FileTime,
    dst_mtime: FileTime,
) -> TransferDecision {
    if !destination_exists {
        return TransferDecision::Proceed;
    }
    match policy {
        OverwriteOption::Skip => TransferDecision::Skip,
        OverwriteOption::Overwrite => TransferDecision::Proceed,
        OverwriteOption::UpdateIfNewer if src_mtime > dst_mtime => TransferDecision::Proceed,
        OverwriteOption::UpdateIfNewer => TransferDecision::Skip,
    }
}
