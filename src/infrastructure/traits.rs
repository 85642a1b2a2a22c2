//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::util::path::PathExt;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Directory listing abstraction.
pub trait DirectoryLister: Send + Sync {
    /// Immediate entries of `dir`, sorted by file name.
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Lists directories with `walkdir`, one level deep.
#[derive(Debug, Default)]
pub struct WalkDirLister;

impl DirectoryLister for WalkDirLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        trace!("list: {}", dir.display());
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            entries.push(DirEntryInfo {
                name: entry.path().file_name_lossy(),
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_directory_when_listing_then_sorted_entries_one_level() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("beta")).unwrap();
        fs::write(temp.path().join("beta/inner.txt"), "x").unwrap();
        fs::write(temp.path().join("alpha.txt"), "x").unwrap();

        let entries = WalkDirLister.list(temp.path()).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "beta"]);
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn given_missing_directory_when_listing_then_io_error() {
        let temp = TempDir::new().unwrap();
        assert!(WalkDirLister.list(&temp.path().join("missing")).is_err());
    }
}
