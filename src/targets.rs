//! Recognized dependency and virtual environment folder names

use std::ffi::OsStr;

/// Folder names treated as targets. Matching is exact and case-sensitive.
pub const TARGET_FOLDERS: &[&str] = &["node_modules", "venv", ".venv", "env", ".env"];

/// Returns true if `name` is one of the recognized target folder names
pub fn is_target(name: &str) -> bool {
    TARGET_FOLDERS.contains(&name)
}

/// Same as [`is_target`] for raw file names; non UTF-8 names never match
pub fn is_target_os(name: &OsStr) -> bool {
    name.to_str().is_some_and(is_target)
}
