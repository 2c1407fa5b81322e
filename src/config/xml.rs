//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - Unknown XML fields are rejected so typos surface instead of being ignored.
//! - Values are trimmed; an empty `<log_file>` keeps the default log path.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::OverwriteOption;
use crate::platform::{set_dir_mode_0700, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "overwrite")]
    overwrite: Option<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config on top of the built-in defaults.
fn xml_to_config(parsed: XmlConfig, path: &Path) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.overwrite.as_deref()) {
        cfg.overwrite = OverwriteOption::parse(s).with_context(|| {
            format!("invalid <overwrite> value '{s}' in '{}' (expected skip, overwrite or update)", path.display())
        })?;
    }
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = LogLevel::parse(s).with_context(|| {
            format!("invalid <log_level> value '{s}' in '{}' (expected quiet, normal, info or debug)", path.display())
        })?;
    }
    if let Some(s) = non_empty(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed, path)
}

/// Load the effective config file, if one exists. Returns the config and the
/// path it came from; `Ok(None)` when there is no file (defaults apply).
pub fn load_config() -> Result<Option<(Config, PathBuf)>> {
    let path = default_config_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok(Some((cfg, path)))
}

fn template_contents() -> String {
    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/treeops.log".into());
    format!(
        "<!--\n  treeops configuration (XML)\n\n  Fields:\n    overwrite  -> skip | overwrite | update   (what to do when a destination exists)\n    log_level  -> quiet | normal | info | debug\n    log_file   -> path to log file (optional; stdout still used)\n\n  Notes:\n    - CLI flags override XML values.\n    - update replaces a destination only when the source is strictly newer.\n-->\n<config>\n  <overwrite>skip</overwrite>\n  <log_level>normal</log_level>\n  <log_file>{suggested_log}</log_file>\n</config>\n"
    )
}

/// Create a template config at `path` (parent 0700, file 0600 on Unix).
/// Refuses to follow a symlinked ancestor or to replace an existing file.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!("Refusing to create config: ancestor of {} is a symlink", path.display());
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    write_config_secure_new_0600(path, template_contents().as_bytes())?;
    info!(path = %path.display(), "Created template config");
    Ok(())
}
