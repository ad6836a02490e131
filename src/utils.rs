//! Shared filesystem and path helpers
//!
//! Windows caps ordinary paths at 260 characters, which deep `node_modules`
//! trees exceed all the time. The `safe_*` wrappers retry with the `\\?\`
//! extended-length prefix when the first attempt fails with
//! ERROR_PATH_NOT_FOUND.

use std::path::{Component, Path, PathBuf};

/// Normalize a path for display (strip Windows long-path prefixes).
pub fn display_path(path: &Path) -> String {
    let path_str = path.to_string_lossy().to_string();
    #[cfg(windows)]
    {
        if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
            return format!(r"\\{}", stripped);
        }
        if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }
    path_str
}

/// Convert to long path format for Windows (\\?\)
#[cfg(windows)]
pub fn to_long_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with(r"\\?\") {
            return path.to_path_buf();
        }
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    if let Some(s) = absolute.to_str() {
        PathBuf::from(format!(r"\\?\{}", s))
    } else {
        path.to_path_buf()
    }
}

#[cfg(not(windows))]
pub fn to_long_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// Safe symlink_metadata that falls back to long path on Windows
#[cfg(windows)]
pub fn safe_symlink_metadata(path: &Path) -> std::io::Result<std::fs::Metadata> {
    match std::fs::symlink_metadata(path) {
        Ok(m) => Ok(m),
        Err(e) if e.raw_os_error() == Some(3) => std::fs::symlink_metadata(to_long_path(path)),
        Err(e) => Err(e),
    }
}

#[cfg(not(windows))]
pub fn safe_symlink_metadata(path: &Path) -> std::io::Result<std::fs::Metadata> {
    std::fs::symlink_metadata(path)
}

/// Safe remove_file that uses long path on Windows
#[cfg(windows)]
pub fn safe_remove_file(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(3) => std::fs::remove_file(to_long_path(path)),
        Err(e) => Err(e),
    }
}

#[cfg(not(windows))]
pub fn safe_remove_file(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path)
}

/// Safe remove_dir that uses long path on Windows
#[cfg(windows)]
pub fn safe_remove_dir(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(3) => std::fs::remove_dir(to_long_path(path)),
        Err(e) => Err(e),
    }
}

#[cfg(not(windows))]
pub fn safe_remove_dir(path: &Path) -> std::io::Result<()> {
    std::fs::remove_dir(path)
}

/// Safe remove_dir_all that uses long path on Windows
#[cfg(windows)]
pub fn safe_remove_dir_all(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(3) => std::fs::remove_dir_all(to_long_path(path)),
        Err(e) => Err(e),
    }
}

#[cfg(not(windows))]
pub fn safe_remove_dir_all(path: &Path) -> std::io::Result<()> {
    std::fs::remove_dir_all(path)
}

/// Join the components of a root-relative path with `/`.
///
/// Returns `None` for paths that escape the root or are not relative
/// (`..`, a drive prefix, a leading separator) and for the empty path.
pub fn to_slash_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_to_long_path() {
        let prefixed = Path::new(r"\\?\C:\Users\test");
        let result = to_long_path(prefixed);
        assert!(result.to_str().unwrap().starts_with(r"\\?\"));

        #[cfg(windows)]
        {
            let normal = Path::new(r"C:\Users\test\file.txt");
            let result = to_long_path(normal);
            assert!(result.to_str().unwrap().starts_with(r"\\?\"));
        }
    }

    #[test]
    fn test_safe_symlink_metadata() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "hello").unwrap();

        let meta = safe_symlink_metadata(&test_file).unwrap();
        assert!(meta.is_file());
    }

    #[test]
    fn test_safe_remove_dir_all() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("f.txt"), "x").unwrap();

        safe_remove_dir_all(&temp_dir.path().join("a")).unwrap();
        assert!(!temp_dir.path().join("a").exists());
    }

    #[test]
    fn test_to_slash_path_joins_components() {
        let rel = Path::new("a").join("b").join("venv");
        assert_eq!(to_slash_path(&rel).as_deref(), Some("a/b/venv"));
    }

    #[test]
    fn test_to_slash_path_rejects_escaping_paths() {
        assert_eq!(to_slash_path(Path::new("../venv")), None);
        assert_eq!(to_slash_path(Path::new("")), None);
        #[cfg(unix)]
        assert_eq!(to_slash_path(Path::new("/abs/venv")), None);
    }

    #[test]
    fn test_display_path_plain() {
        assert_eq!(display_path(Path::new("some/dir")), "some/dir");
    }
}
