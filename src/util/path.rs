use std::path::{Path, PathBuf};

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` syntax
/// - `${VAR}` syntax
/// - `~` for home directory
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand `path` and resolve it against `base` unless it is absolute.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(path));
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Directory containing `file`, `.` for bare file names.
pub fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
