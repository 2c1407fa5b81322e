//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - --print-config and --init-config run without a subcommand.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::fs_ops::OverwriteOption;

/// Symlink-aware copy, move and remove of files and directory trees.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Symlink-aware recursive copy, move and remove")]
pub struct Args {
    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also write logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Write logs to this file as well")]
    pub log_file: Option<PathBuf>,

    /// Print where treeops will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by treeops and exit")]
    pub print_config: bool,

    /// Write a template config file at the config location, then exit.
    #[arg(long, help = "Create a template config file and exit")]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy a file, symlink or directory tree. Symlinks are copied as links.
    Copy {
        #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
        source: PathBuf,
        #[arg(value_name = "DEST", value_hint = ValueHint::AnyPath)]
        destination: PathBuf,
        /// What to do when the destination exists: skip, overwrite or update.
        #[arg(long, short = 'o', value_name = "POLICY")]
        overwrite: Option<OverwriteOption>,
    },
    /// Move (rename) a file, symlink or directory.
    Move {
        #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
        source: PathBuf,
        #[arg(value_name = "DEST", value_hint = ValueHint::AnyPath)]
        destination: PathBuf,
        /// What to do when the destination exists: skip, overwrite or update.
        #[arg(long, short = 'o', value_name = "POLICY")]
        overwrite: Option<OverwriteOption>,
    },
    /// Remove a file, symlink or directory tree without following links.
    Remove {
        #[arg(value_name = "PATH", value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Copy { .. } => "copy",
            Command::Move { .. } => "move",
            Command::Remove { .. } => "remove",
        }
    }

    /// Per-command `--overwrite`, if given.
    pub fn overwrite(&self) -> Option<OverwriteOption> {
        match self {
            Command::Copy { overwrite, .. } | Command::Move { overwrite, .. } => *overwrite,
            Command::Remove { .. } => None,
        }
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if let Some(policy) = self.command.as_ref().and_then(Command::overwrite) {
            cfg.overwrite = policy;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_with_policy_overrides_config() {
        let args = Args::try_parse_from(["treeops", "copy", "a", "b", "--overwrite", "newer"]).unwrap();
        let mut cfg = Config::default();
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.overwrite, OverwriteOption::UpdateIfNewer);
        assert_eq!(args.command.as_ref().unwrap().name(), "copy");
    }

    #[test]
    fn missing_policy_keeps_config_value() {
        let args = Args::try_parse_from(["treeops", "-d", "move", "a", "b"]).unwrap();
        let mut cfg = Config {
            overwrite: OverwriteOption::Overwrite,
            ..Config::default()
        };
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.overwrite, OverwriteOption::Overwrite);
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn bad_policy_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["treeops", "copy", "a", "b", "--overwrite", "maybe"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from(["treeops", "remove", "x", "--json", "--log-level", "quiet"]).unwrap();
        assert!(args.json);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Quiet));
    }
}
