//! Mock system implementation for testing

use super::{System, WalkEntry};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem, working directory and home,
/// perfect for fast, isolated unit tests without side effects.
///
/// # Example
/// ```
/// use tagsnap::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_home("/home/user").unwrap()
///     .with_file("/repo/README.md", b"Hello, world!").unwrap()
///     .with_dir("/repo/.git").unwrap();
///
/// assert_eq!(system.home_dir(), Some("/home/user".into()));
/// assert!(system.exists(Path::new("/repo/README.md")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    current_dir: PathBuf,
    home_dir: Option<PathBuf>,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    /// Paths whose removal, read or walk fails with `PermissionDenied`
    failing: HashSet<PathBuf>,
    /// Files that stand for symbolic links
    symlinks: HashSet<PathBuf>,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                current_dir: PathBuf::from("/"),
                home_dir: None,
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
                failing: HashSet::new(),
                symlinks: HashSet::new(),
            })),
        }
    }

    /// Set the current working directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.current_dir = dir.as_ref().to_path_buf();
        drop(state);
        Ok(self)
    }

    /// Set the home directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_home<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.home_dir = Some(dir.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;

        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Add a symbolic link (builder pattern)
    ///
    /// The link is stored as an empty file that reports itself as a link;
    /// its target is not modelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_symlink<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let system = self.with_file(path, b"")?;
        let mut state = system.write_state()?;
        state.symlinks.insert(path.to_path_buf());
        drop(state);
        Ok(system)
    }

    /// Make reads, removals and walks of `path` fail (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_failure<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.failing.insert(path.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    fn write_state(&self) -> io::Result<std::sync::RwLockWriteGuard<'_, MockSystemState>> {
        self.state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn read_state(&self) -> io::Result<std::sync::RwLockReadGuard<'_, MockSystemState>> {
        self.state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor == Path::new("") {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check_failure(state: &MockSystemState, path: &Path) -> io::Result<()> {
        if state.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn children(state: &MockSystemState, path: &Path) -> Vec<PathBuf> {
        let files = state.files.keys();
        let dirs = state.dirs.iter().filter(|dir| dir.as_path() != path);
        files
            .chain(dirs)
            .filter(|child| child.parent() == Some(path))
            .cloned()
            .collect()
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.read_state()?.current_dir.clone())
    }

    #[inline]
    fn home_dir(&self) -> Option<PathBuf> {
        self.read_state().ok()?.home_dir.clone()
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.read_state()?;
        Self::check_failure(&state, path)?;
        let bytes = state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        drop(state);
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        Self::check_failure(&state, path)?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        state.files.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        Self::check_failure(&state, path)?;

        state.symlinks.remove(path);
        if state.files.remove(path).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ));
        }

        drop(state);
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path) || state.dirs.contains(path))
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path))
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.read_state().is_ok_and(|state| state.dirs.contains(path))
    }

    #[inline]
    fn is_symlink(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.symlinks.contains(path))
    }

    #[inline]
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.read_state()?;

        if !state.dirs.contains(path) {
            let kind = if state.files.contains_key(path) {
                io::ErrorKind::NotADirectory
            } else {
                io::ErrorKind::NotFound
            };
            return Err(io::Error::new(
                kind,
                format!("Directory not found: {}", path.display()),
            ));
        }

        let entries = Self::children(&state, path);
        drop(state);
        Ok(entries)
    }

    #[inline]
    fn walk_dir(
        &self,
        path: &Path,
        _follow_links: bool,
        hidden: bool,
    ) -> io::Result<Vec<WalkEntry>> {
        let state = self.read_state()?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        let mut entries = Vec::new();
        let mut to_visit = vec![path.to_path_buf()];

        while let Some(current) = to_visit.pop() {
            Self::check_failure(&state, &current)?;
            for child in Self::children(&state, &current) {
                let is_hidden = child
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('.'));
                if is_hidden && !hidden {
                    continue;
                }

                let is_dir = state.dirs.contains(&child);
                if is_dir {
                    to_visit.push(child.clone());
                }
                entries.push(WalkEntry {
                    is_file: state.files.contains_key(&child),
                    is_dir,
                    path: child,
                });
            }
        }

        drop(state);

        // Sort entries by path for deterministic output
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_dir_all_removes_descendants_only() {
        let system = MockSystem::new()
            .with_file("/repo/docs/a.md", b"a")
            .unwrap()
            .with_file("/repo/docs/deep/b.md", b"b")
            .unwrap()
            .with_file("/repo/docsite/c.md", b"c")
            .unwrap();

        system.remove_dir_all(Path::new("/repo/docs")).unwrap();

        assert!(!system.exists(Path::new("/repo/docs")));
        assert!(!system.exists(Path::new("/repo/docs/deep/b.md")));
        assert!(system.exists(Path::new("/repo/docsite/c.md")));
        assert!(system.is_dir(Path::new("/repo")));
    }

    #[test]
    fn test_read_dir_lists_immediate_children() {
        let system = MockSystem::new()
            .with_file("/repo/first", b"1")
            .unwrap()
            .with_file("/repo/sub/inner", b"2")
            .unwrap();

        let mut entries = system.read_dir(Path::new("/repo")).unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![PathBuf::from("/repo/first"), PathBuf::from("/repo/sub")]
        );
    }

    #[test]
    fn test_failure_injection() {
        let system = MockSystem::new()
            .with_file("/repo/locked", b"x")
            .unwrap()
            .with_failure("/repo/locked")
            .unwrap();

        let err = system.remove_file(Path::new("/repo/locked")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(system.exists(Path::new("/repo/locked")));
    }
}
