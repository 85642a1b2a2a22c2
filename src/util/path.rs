use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Expand environment variables and `~` in a path string.
///
/// Handles `~`, `$VAR`, and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expands `path` and anchors a relative result at `base`.
pub fn resolve_path(path: &str, base: Option<&Path>) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(path));
    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}

pub trait PathExt {
    /// Dot-file convention: the last component starts with `.`
    fn is_hidden(&self) -> bool;
    fn file_name_lossy(&self) -> String;
}

impl PathExt for Path {
    fn is_hidden(&self) -> bool {
        self.file_name()
            .and_then(OsStr::to_str)
            .map(|n| n.starts_with('.') && n != "." && n != "..")
            .unwrap_or(false)
    }

    fn file_name_lossy(&self) -> String {
        self.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.to_string_lossy().into_owned())
    }
}
