//! Sparse-checkout pruning of a fully checked-out working tree
//!
//! libgit2 always writes the whole tree; the allowlist in
//! `.git/info/sparse-checkout` is applied afterwards by deleting every
//! top-level entry it does not cover.

use crate::error::SnapError;
use crate::system::System;
use core::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the repository metadata directory
pub const METADATA_DIR: &str = ".git";

/// Directory inside the metadata directory holding the sparse file
pub const INFO_DIR: &str = "info";

/// Sparse-checkout allowlist file name
pub const SPARSE_FILE: &str = "sparse-checkout";

/// Hidden entries are never pruned
#[must_use]
#[inline]
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Allowlist of top-level entries read from the sparse-checkout file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSpec {
    entries: Vec<String>,
}

impl SparseSpec {
    /// Split raw file content into entries, one per line
    ///
    /// Lines are kept verbatim. A trailing newline produces a trailing empty
    /// entry, which can never match a file name.
    #[must_use]
    #[inline]
    pub fn parse(content: &str) -> Self {
        Self {
            entries: content.split('\n').map(str::to_owned).collect(),
        }
    }

    #[must_use]
    #[inline]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Whether a top-level entry survives the prune
    ///
    /// Hidden names are always covered. Otherwise the name must equal an
    /// entry, or an entry written with one trailing path separator.
    #[must_use]
    #[inline]
    pub fn covers(&self, name: &str) -> bool {
        is_hidden(name)
            || self.entries.iter().any(|entry| {
                entry == name || strip_separator(entry).is_some_and(|dir| dir == name)
            })
    }
}

fn strip_separator(entry: &str) -> Option<&str> {
    entry
        .strip_suffix('/')
        .or_else(|| entry.strip_suffix(MAIN_SEPARATOR))
}

/// Why a prune did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `.git/info` does not exist
    NoInfoDirectory,
    /// `.git/info/sparse-checkout` does not exist
    NoSparseFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NoInfoDirectory => write!(f, "no {METADATA_DIR}/{INFO_DIR} directory"),
            Self::NoSparseFile => write!(f, "no {METADATA_DIR}/{INFO_DIR}/{SPARSE_FILE} file"),
        }
    }
}

/// Entries removed and kept by a prune
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Top-level names deleted (or that would be, in a dry run), in name order
    pub removed: Vec<String>,
    /// Top-level names left in place, hidden ones included
    pub kept: Vec<String>,
    /// Files under the removed entries
    pub files_removed: usize,
    pub dry_run: bool,
}

/// Result of running the pruner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// No sparse-checkout specification is configured
    Skipped(SkipReason),
    Pruned(PruneReport),
}

impl PruneOutcome {
    /// Names removed by the prune; empty when skipped
    #[must_use]
    #[inline]
    pub fn removed(&self) -> &[String] {
        match self {
            Self::Skipped(_) => &[],
            Self::Pruned(report) => &report.removed,
        }
    }
}

/// Deletes top-level working-tree entries not covered by the sparse spec
pub struct SparsePruner<'src> {
    system: &'src dyn System,
    workdir: &'src Path,
    dry_run: bool,
}

impl<'src> SparsePruner<'src> {
    #[must_use]
    #[inline]
    pub fn new(system: &'src dyn System, workdir: &'src Path) -> Self {
        Self {
            system,
            workdir,
            dry_run: false,
        }
    }

    /// Only report what would be removed
    #[must_use]
    #[inline]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Locate the sparse-checkout file, if one is configured
    ///
    /// # Errors
    ///
    /// `MetadataNotFound` when the working directory has no `.git` entry,
    /// `PruneIoFailed` when a directory cannot be listed
    #[inline]
    pub fn locate_spec(&self) -> Result<Result<PathBuf, SkipReason>, SnapError> {
        let metadata = self
            .find_entry(self.workdir, METADATA_DIR)?
            .ok_or_else(|| SnapError::metadata_not_found(self.workdir))?;

        let Some(info) = self.find_entry(&metadata, INFO_DIR)? else {
            return Ok(Err(SkipReason::NoInfoDirectory));
        };

        Ok(self
            .find_entry(&info, SPARSE_FILE)?
            .ok_or(SkipReason::NoSparseFile))
    }

    /// Read and parse the sparse-checkout file
    ///
    /// # Errors
    ///
    /// Same as [`Self::locate_spec`], plus `PruneIoFailed` if the file cannot
    /// be read
    #[inline]
    pub fn load_spec(&self) -> Result<Result<SparseSpec, SkipReason>, SnapError> {
        let path = match self.locate_spec()? {
            Ok(path) => path,
            Err(reason) => return Ok(Err(reason)),
        };

        let content = self
            .system
            .read_to_string(&path)
            .map_err(|e| SnapError::prune_io(&path, &e))?;
        let spec = SparseSpec::parse(&content);
        debug!(
            "Loaded {} sparse-checkout entries from {}",
            spec.entries().len(),
            path.display()
        );
        Ok(Ok(spec))
    }

    /// Run the prune
    ///
    /// # Errors
    ///
    /// `MetadataNotFound` if `.git` is missing (nothing is deleted), or
    /// `PruneIoFailed` for the first listing, read or delete that fails.
    /// Entries deleted before a failure stay deleted.
    #[inline]
    pub fn prune(&self) -> Result<PruneOutcome, SnapError> {
        let spec = match self.load_spec()? {
            Ok(spec) => spec,
            Err(reason) => {
                info!("Skipping sparse prune: {reason}");
                return Ok(PruneOutcome::Skipped(reason));
            }
        };

        let mut report = PruneReport {
            dry_run: self.dry_run,
            ..PruneReport::default()
        };

        for (name, path) in self.list_entries(self.workdir)? {
            if spec.covers(&name) {
                debug!("Keeping {name}");
                report.kept.push(name);
                continue;
            }

            let files = self.count_files(&path);
            if self.dry_run {
                info!("Would remove {name} ({files} files)");
            } else {
                self.remove_entry(&path)?;
                debug!("Removed {name} ({files} files)");
            }
            report.files_removed += files;
            report.removed.push(name);
        }

        info!(
            "Sparse prune {} {} entries ({} files), kept {}",
            if self.dry_run { "would remove" } else { "removed" },
            report.removed.len(),
            report.files_removed,
            report.kept.len()
        );

        Ok(PruneOutcome::Pruned(report))
    }

    /// Immediate children of `dir` as (name, path), sorted by name
    fn list_entries(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>, SnapError> {
        let mut entries: Vec<(String, PathBuf)> = self
            .system
            .read_dir(dir)
            .map_err(|e| SnapError::prune_io(dir, &e))?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some((name, path))
            })
            .collect();
        entries.sort();
        Ok(entries)
    }

    /// Find the child of `dir` literally named `name` by listing `dir`
    fn find_entry(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>, SnapError> {
        Ok(self
            .list_entries(dir)?
            .into_iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, path)| path))
    }

    /// Files under `path` for the report; links count as one file
    ///
    /// The count is informational, so a subtree that cannot be walked is
    /// logged and counted as zero instead of failing the prune.
    fn count_files(&self, path: &Path) -> usize {
        if self.system.is_symlink(path) || !self.system.is_dir(path) {
            return 1;
        }
        match self.system.walk_dir(path, false, true) {
            Ok(entries) => entries.iter().filter(|entry| entry.is_file).count(),
            Err(e) => {
                warn!("Cannot count files under {}: {e}", path.display());
                0
            }
        }
    }

    /// `remove_dir_all` removes a link to a directory without following it
    fn remove_entry(&self, path: &Path) -> Result<(), SnapError> {
        let result = if self.system.is_dir(path) {
            self.system.remove_dir_all(path)
        } else {
            self.system.remove_file(path)
        };
        result.map_err(|e| SnapError::prune_io(path, &e))
    }
}
