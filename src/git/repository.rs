//! Repository handle and the git operations of a checkout session

use crate::error::SnapError;
use crate::git::credentials::SshCredentials;
use crate::git::options::{CheckoutStrategy, TagLookup};
use crate::git::tags::{ResolvedTag, TagScan, tag_reference};
use git2::{ErrorCode, FetchOptions, ObjectType, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Git operations a checkout session needs from a repository
///
/// `GitRepository` implements this on top of libgit2; tests substitute
/// [`crate::git::MockRepository`].
pub trait TagRepository {
    /// Root of the working directory
    fn workdir(&self) -> &Path;

    /// Fetch `refspecs` from the named remote
    ///
    /// # Errors
    ///
    /// `RemoteNotFound` if the remote is not configured, `FetchFailed` on
    /// network or authentication failure
    fn fetch(
        &self,
        remote: &str,
        refspecs: &[String],
        credentials: &SshCredentials,
    ) -> Result<(), SnapError>;

    /// Resolve a tag name to the commit it points at
    ///
    /// # Errors
    ///
    /// `TagNotFound` when no tag has exactly this name, `ObjectDatabase` when
    /// the lookup itself fails
    fn resolve_tag(&self, name: &str, lookup: TagLookup) -> Result<ResolvedTag, SnapError>;

    /// Write the tag's tree into the working directory and point HEAD at it
    ///
    /// # Errors
    ///
    /// `CheckoutFailed` or `HeadUpdateFailed`
    fn checkout_tag(&self, tag: &ResolvedTag, strategy: CheckoutStrategy)
    -> Result<(), SnapError>;
}

/// An opened on-disk repository with a working directory
///
/// The libgit2 handle is released when this value is dropped.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
    show_progress: bool,
}

impl GitRepository {
    /// Open the repository at `path`
    ///
    /// # Errors
    ///
    /// Returns `OpenFailed` if `path` is not a git repository or is bare
    #[inline]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SnapError> {
        let path = path.as_ref();
        let repo =
            Repository::open(path).map_err(|e| SnapError::open_failed(path, e.message()))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| SnapError::open_failed(path, "repository has no working directory"))?
            .to_path_buf();

        debug!("Opened repository at {}", workdir.display());

        Ok(Self {
            repo,
            workdir,
            show_progress: true,
        })
    }

    /// Show a progress bar while fetching
    #[must_use]
    #[inline]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Release the repository handle
    #[inline]
    pub fn close(self) {
        debug!("Closing repository at {}", self.workdir.display());
        drop(self);
    }

    fn fetch_progress(&self, remote: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner} Fetching {msg} [{bar:30}] {pos}/{len} objects",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message(remote.to_owned());
        bar
    }

    fn scan_for_tag(&self, name: &str) -> Result<ResolvedTag, SnapError> {
        let odb = self.repo.odb().map_err(SnapError::object_database)?;
        // A re-tagged name leaves the old tag object behind; the reference
        // names the current one
        let current = self.repo.refname_to_id(&tag_reference(name)).ok();
        let mut scan = TagScan::new(name).prefer(current);

        let walk = odb.foreach(|oid| {
            let object = odb.read_header(*oid).and_then(|(_, kind)| {
                if kind != ObjectType::Tag {
                    return Ok(None);
                }
                let tag = self.repo.find_tag(*oid)?;
                Ok(Some(ResolvedTag {
                    name: String::from_utf8_lossy(tag.name_bytes()).into_owned(),
                    object_id: tag.id(),
                    target_id: tag.target_id(),
                }))
            });
            scan.observe(object)
        });

        // A callback that stops the walk surfaces as a user error; keep the
        // error recorded by the scan in that case
        if let Err(err) = walk
            && err.code() != ErrorCode::User
        {
            scan.fail(err);
        }

        scan.finish()
            .map_err(SnapError::object_database)?
            .ok_or_else(|| SnapError::tag_not_found(name))
    }

    fn lookup_tag_reference(&self, name: &str) -> Result<ResolvedTag, SnapError> {
        let reference_name = tag_reference(name);
        let reference = self.repo.find_reference(&reference_name).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                SnapError::tag_not_found(name)
            } else {
                SnapError::object_database(e.message())
            }
        })?;

        let resolved = reference
            .resolve()
            .map_err(|e| SnapError::object_database(e.message()))?;
        let object_id = resolved
            .target()
            .ok_or_else(|| SnapError::object_database(format!("{reference_name} has no target")))?;
        let commit = resolved
            .peel_to_commit()
            .map_err(|e| SnapError::object_database(e.message()))?;

        Ok(ResolvedTag {
            name: name.to_owned(),
            object_id,
            target_id: commit.id(),
        })
    }
}

impl TagRepository for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn fetch(
        &self,
        remote_name: &str,
        refspecs: &[String],
        credentials: &SshCredentials,
    ) -> Result<(), SnapError> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| SnapError::remote_not_found(remote_name, e.message()))?;

        debug!(
            "Fetching {} from {} ({})",
            refspecs.join(" "),
            remote_name,
            remote.url().unwrap_or("<invalid url>")
        );

        let progress = self.fetch_progress(remote_name);
        let mut options = FetchOptions::new();
        options.remote_callbacks(credentials.remote_callbacks(&progress));

        let result = remote.fetch(refspecs, Some(&mut options), None);
        progress.finish_and_clear();
        result.map_err(|e| SnapError::fetch_failed(remote_name, e.message()))?;

        let stats = remote.stats();
        info!(
            "Fetched {} objects ({} bytes) from {remote_name}",
            stats.received_objects(),
            stats.received_bytes()
        );

        Ok(())
    }

    fn resolve_tag(&self, name: &str, lookup: TagLookup) -> Result<ResolvedTag, SnapError> {
        debug!("Resolving tag '{name}' by {lookup}");
        let tag = match lookup {
            TagLookup::Scan => self.scan_for_tag(name)?,
            TagLookup::Reference => self.lookup_tag_reference(name)?,
        };
        debug!("Tag '{name}' -> commit {}", tag.target_id);
        Ok(tag)
    }

    fn checkout_tag(
        &self,
        tag: &ResolvedTag,
        strategy: CheckoutStrategy,
    ) -> Result<(), SnapError> {
        let commit = self
            .repo
            .find_commit(tag.target_id)
            .map_err(|e| SnapError::checkout_failed(&tag.name, e.message()))?;
        let tree = commit
            .tree()
            .map_err(|e| SnapError::checkout_failed(&tag.name, e.message()))?;

        debug!(
            "Checking out tree {} of commit {} with '{strategy}' strategy",
            tree.id(),
            commit.id()
        );

        let mut builder = strategy.builder();
        self.repo
            .checkout_tree(tree.as_object(), Some(&mut builder))
            .map_err(|e| SnapError::checkout_failed(&tag.name, e.message()))?;

        let reference = tag.reference();
        self.repo
            .set_head(&reference)
            .map_err(|e| SnapError::head_update_failed(&reference, e.message()))?;

        debug!("HEAD now at {reference}");
        Ok(())
    }
}
