//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.
//!
//! The link capability (`is_link`, `is_link_to_directory`, `read_link_target`,
//! `create_symlink`, `remove_symlink`) has the same signature on every target.

#[cfg(unix)]
mod common_unix;
mod temp;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::{
    create_symlink, is_executable, is_link, is_link_to_directory, is_readable, is_writable,
    link_entry_is_dir, open_log_file_secure_append, read_link_target, remove_symlink, set_dir_mode_0700,
    write_config_secure_new_0600,
};

#[cfg(windows)]
pub use windows::{
    create_symlink, is_executable, is_link, is_link_to_directory, is_readable, is_writable,
    link_entry_is_dir, open_log_file_secure_append, read_link_target, remove_symlink, set_dir_mode_0700,
    write_config_secure_new_0600,
};
