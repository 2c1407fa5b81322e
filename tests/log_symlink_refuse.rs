#![cfg(unix)]

//! A log file whose directory is reached through a symlink must not be opened.
//!
//! The parent test re-runs this test binary with HOME pointed at a temp dir so
//! the default log path is isolated; the ignored child swaps the treeops data
//! directory for a symlink and checks the detection.

use std::fs;
use std::os::unix::fs as unix_fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn log_file_symlink_parent_refused() {
    let temp_home = tempdir().expect("temp HOME");
    let outside = tempdir().expect("outside target");

    let me = std::env::current_exe().expect("current test binary");
    let status = Command::new(me)
        .arg("--ignored")
        .arg("--exact")
        .arg("log_file_symlink_parent_refused_child")
        .env("HOME", temp_home.path())
        .env_remove("XDG_DATA_HOME")
        .env_remove("TREEOPS_CONFIG")
        .env("TREEOPS_OUTSIDE", outside.path())
        .status()
        .expect("spawn child test");
    assert!(status.success(), "child test failed: {status}");
}

#[test]
#[ignore]
fn log_file_symlink_parent_refused_child() {
    let log_path = treeops::default_log_path().expect("default_log_path should resolve");
    assert!(
        !treeops::path_has_symlink_ancestor(&log_path).unwrap(),
        "baseline: no symlink ancestor expected for {}",
        log_path.display()
    );

    let app_dir = log_path.parent().expect("log_path has parent").to_path_buf();
    fs::create_dir_all(app_dir.parent().expect("app dir has parent")).unwrap();

    let outside = std::path::PathBuf::from(
        std::env::var_os("TREEOPS_OUTSIDE").expect("outside dir provided by parent"),
    );
    if app_dir.exists() {
        fs::remove_dir_all(&app_dir).unwrap();
    }
    unix_fs::symlink(&outside, &app_dir).unwrap();

    assert!(
        treeops::path_has_symlink_ancestor(&log_path).unwrap(),
        "symlink ancestor should be detected for {}",
        log_path.display()
    );
}
