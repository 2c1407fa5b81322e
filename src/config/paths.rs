//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.
//!
//! `TREEOPS_CONFIG` overrides the config location: relative values are resolved
//! against the current directory, a directory value means `<dir>/config.xml`,
//! and the default log file then lives next to that config.

use anyhow::{Context, Result, bail};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file (or directory).
pub const CONFIG_ENV: &str = "TREEOPS_CONFIG";

const APP_DIR: &str = "treeops";
const CONFIG_FILE: &str = "config.xml";
const LOG_FILE: &str = "treeops.log";

/// Config path from `TREEOPS_CONFIG`, if set and non-empty.
pub fn env_config_path() -> Result<Option<PathBuf>> {
    let Some(raw) = env::var_os(CONFIG_ENV) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let mut p = PathBuf::from(raw);
    if p.is_relative() {
        let cwd = env::current_dir().context("resolve current directory for TREEOPS_CONFIG")?;
        p = cwd.join(p);
    }
    if p.is_dir() {
        p.push(CONFIG_FILE);
    }
    Ok(Some(p))
}

/// Effective config path: `TREEOPS_CONFIG`, else the OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env_config_path()? {
        return Ok(p);
    }
    if let Some(base) = config_dir() {
        return Ok(base.join(APP_DIR).join(CONFIG_FILE));
    }
    match env::var_os("HOME") {
        Some(h) => Ok(PathBuf::from(h).join(".config").join(APP_DIR).join(CONFIG_FILE)),
        None => bail!("cannot determine a config directory (no config dir and HOME unset)"),
    }
}

/// Default log file: next to an explicit config, else in the OS data dir.
pub fn default_log_path() -> Result<PathBuf> {
    if let Some(cfg) = env_config_path()? {
        let dir = cfg.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        return Ok(dir.join(LOG_FILE));
    }
    if let Some(base) = data_dir() {
        let dir = base.join(APP_DIR);
        // best-effort; the logger reports a failure to open later
        let _ = fs::create_dir_all(&dir);
        return Ok(dir.join(LOG_FILE));
    }
    match env::var_os("HOME") {
        Some(h) => Ok(PathBuf::from(h)
            .join(".local")
            .join("share")
            .join(APP_DIR)
            .join(LOG_FILE)),
        None => bail!("cannot determine a data directory (no data dir and HOME unset)"),
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.as_os_str().is_empty() {
            break;
        }
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        p = anc.parent();
    }
    Ok(false)
}
