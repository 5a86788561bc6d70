//! Real system implementation using `std::env` and `std::fs`

use super::{System, WalkEntry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Production implementation of System trait
///
/// Delegates directly to the standard library, `walkdir` and `dirs`.
#[derive(Debug, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub const fn new() -> Self {
        return Self;
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RealSystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn walk_dir(
        &self,
        path: &Path,
        follow_links: bool,
        hidden: bool,
    ) -> io::Result<Vec<WalkEntry>> {
        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(follow_links)
            .follow_root_links(follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                hidden
                    || entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.starts_with('.'))
            });

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let file_type = entry.file_type();
            entries.push(WalkEntry {
                path: entry.into_path(),
                is_file: file_type.is_file(),
                is_dir: file_type.is_dir(),
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
    fn test_walk_dir_skips_hidden_when_requested() {
        let temp = TempDir::new().unwrap();
        let temp_dir = temp.path();
        fs::create_dir_all(temp_dir.join("dir/.secret")).unwrap();
        fs::write(temp_dir.join("dir/a.txt"), "a").unwrap();
        fs::write(temp_dir.join("dir/.secret/b.txt"), "b").unwrap();

        let system = RealSystem::new();
        let visible = system.walk_dir(temp_dir, false, false).unwrap();
        let all = system.walk_dir(temp_dir, false, true).unwrap();

        assert_eq!(visible.iter().filter(|e| e.is_file).count(), 1);
        assert_eq!(all.iter().filter(|e| e.is_file).count(), 2);
    }
}
