//! Application orchestrator.
//! Loads/merges config, initializes logging and runs the requested engine operation.

use anyhow::{Result, bail};
use tracing::{debug, error};

use treeops::cli::{Args, Command};
use treeops::config::{CONFIG_ENV, create_template_config, default_config_path, load_config};
use treeops::output as out;
use treeops::{Config, FsError, TransferReport, copy, move_path, remove};

use crate::logging::init_tracing;

fn print_config_location() -> Result<()> {
    if let Some(cfg_env) = std::env::var_os(CONFIG_ENV) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}\n",
            cfg_env.to_string_lossy()
        ));
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("treeops config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a config path: {e}")),
    }
    Ok(())
}

fn init_config() -> Result<()> {
    let path = default_config_path()?;
    create_template_config(&path)?;
    out::print_success(&format!("A template treeops config was written to: {}", path.display()));
    out::print_info(&format!(
        "Edit it to set `overwrite`, `log_level` and `log_file`. To use a different location set {CONFIG_ENV}."
    ));
    Ok(())
}

fn summary(command: &Command, report: &TransferReport) -> String {
    match command {
        Command::Copy { source, destination, .. } => format!(
            "Copied '{}' -> '{}': {} file(s), {} link(s), {} dir(s) created, {} skipped",
            source.display(),
            destination.display(),
            report.files_copied,
            report.links_created,
            report.dirs_created,
            report.entries_skipped
        ),
        Command::Move { source, destination, .. } => {
            if report.entries_moved > 0 {
                format!("Moved '{}' -> '{}'", source.display(), destination.display())
            } else {
                format!("Skipped '{}': destination '{}' kept", source.display(), destination.display())
            }
        }
        Command::Remove { path } => {
            format!("Removed '{}': {} entr(ies)", path.display(), report.entries_removed)
        }
    }
}

fn execute(command: &Command, cfg: &Config) -> Result<TransferReport, FsError> {
    match command {
        Command::Copy { source, destination, .. } => copy(source, destination, cfg.overwrite),
        Command::Move { source, destination, .. } => move_path(source, destination, cfg.overwrite),
        Command::Remove { path } => remove(path),
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Informational flags run before logging init
    if args.print_config {
        return print_config_location();
    }
    if args.init_config {
        return init_config();
    }

    let Some(command) = args.command.clone() else {
        out::print_error("No command given. Use one of: copy, move, remove (see --help).");
        bail!("no command given");
    };

    // Config file values first, then CLI overrides (CLI wins)
    let mut cfg = match load_config() {
        Ok(Some((cfg, _path))) => cfg,
        Ok(None) => Config::default(),
        Err(e) => {
            out::print_error(&format!("Failed to load config: {e:#}"));
            return Err(e);
        }
    };
    args.apply_overrides(&mut cfg);

    // Held until the end of run so the file appender flushes
    let _guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    debug!(?args, overwrite = %cfg.overwrite, "Starting treeops");

    match execute(&command, &cfg) {
        Ok(report) => {
            out::print_user(&summary(&command, &report));
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), kind = %e.kind(), error = %e, "{} failed", command.name());
            Err(e.into())
        }
    }
}
