#![cfg(windows)]

use std::io::Write;
use tempfile::tempdir;
use treeops::platform::{create_symlink, is_link, is_link_to_directory, open_log_file_secure_append, read_link_target};

#[test]
fn windows_open_log_file_allows_append_and_writes() {
    let td = tempdir().expect("tempdir");
    let log_path = td.path().join("treeops_windows_test.log");

    let mut file = open_log_file_secure_append(&log_path).expect("open_log_file_secure_append");
    writeln!(file, "hello windows").expect("write");
    drop(file);

    let contents = std::fs::read_to_string(&log_path).expect("read file");
    assert!(contents.contains("hello windows"));
}

#[test]
fn windows_directory_link_reads_back_without_nt_prefix() {
    let td = tempdir().expect("tempdir");
    let target = td.path().join("target");
    std::fs::create_dir(&target).unwrap();
    let link = td.path().join("link");

    // Needs developer mode or the symlink privilege.
    if let Err(e) = create_symlink(&link, &target, true) {
        eprintln!("Skipping: cannot create symlinks here: {e}");
        return;
    }

    assert!(is_link(&link).unwrap());
    assert!(is_link_to_directory(&link).unwrap());
    let read = read_link_target(&link).unwrap();
    assert!(!read.to_string_lossy().starts_with(r"\??\"), "got {}", read.display());
    assert_eq!(read, target);
    assert!(!is_link(&target).unwrap());
}

#[test]
fn windows_junction_is_removed_as_a_directory() {
    let td = tempdir().expect("tempdir");
    let target = td.path().join("real");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep.txt"), b"k").unwrap();
    let junction = td.path().join("junction");

    let made = std::process::Command::new("cmd")
        .args(["/C", "mklink", "/J"])
        .arg(&junction)
        .arg(&target)
        .output();
    match made {
        Ok(out) if out.status.success() => {}
        _ => {
            eprintln!("Skipping: mklink /J unavailable");
            return;
        }
    }

    let report = treeops::remove(&junction).expect("remove junction");
    assert_eq!(report.entries_removed, 1);
    assert!(std::fs::symlink_metadata(&junction).is_err());
    assert!(target.join("keep.txt").exists());
}
