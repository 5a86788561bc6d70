//! Mock repository implementation for testing

use super::{CheckoutStrategy, ResolvedTag, SshCredentials, TagLookup, TagRepository};
use crate::error::SnapError;
use git2::Oid;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A call made against a [`MockRepository`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    Fetch { remote: String, refspecs: Vec<String> },
    ResolveTag { name: String, lookup: TagLookup },
    CheckoutTag { name: String, strategy: CheckoutStrategy },
}

/// In-memory stand-in for a git repository
///
/// Knows a fixed set of tag names and records every call, so tests can
/// check which steps of a session ran.
///
/// # Example
/// ```
/// use tagsnap::git::{MockRepository, TagLookup, TagRepository};
///
/// let repo = MockRepository::new("/repo").with_tag("v1.0");
/// assert!(repo.resolve_tag("v1.0", TagLookup::Scan).is_ok());
/// assert!(repo.resolve_tag("v1", TagLookup::Scan).is_err());
/// ```
pub struct MockRepository {
    workdir: PathBuf,
    tags: Vec<String>,
    remotes: Vec<String>,
    fetch_error: Option<String>,
    checkout_error: Option<String>,
    calls: RwLock<Vec<RepositoryCall>>,
}

impl MockRepository {
    /// Create a repository with an `origin` remote and no tags
    #[must_use]
    #[inline]
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
            tags: Vec::new(),
            remotes: vec!["origin".to_owned()],
            fetch_error: None,
            checkout_error: None,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Add a tag (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_tag(mut self, name: &str) -> Self {
        self.tags.push(name.to_owned());
        self
    }

    /// Remove all remotes (builder pattern)
    #[must_use]
    #[inline]
    pub fn without_remotes(mut self) -> Self {
        self.remotes.clear();
        self
    }

    /// Make every fetch fail with `message` (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_fetch_error(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_owned());
        self
    }

    /// Make every checkout fail with `message` (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_checkout_error(mut self, message: &str) -> Self {
        self.checkout_error = Some(message.to_owned());
        self
    }

    /// Calls made so far, oldest first
    #[must_use]
    #[inline]
    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: RepositoryCall) {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(call);
        }
    }
}

impl TagRepository for MockRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn fetch(
        &self,
        remote: &str,
        refspecs: &[String],
        _credentials: &SshCredentials,
    ) -> Result<(), SnapError> {
        self.record(RepositoryCall::Fetch {
            remote: remote.to_owned(),
            refspecs: refspecs.to_vec(),
        });

        if !self.remotes.iter().any(|known| known == remote) {
            return Err(SnapError::remote_not_found(remote, "remote does not exist"));
        }
        if let Some(message) = self.fetch_error.as_ref() {
            return Err(SnapError::fetch_failed(remote, message));
        }
        Ok(())
    }

    fn resolve_tag(&self, name: &str, lookup: TagLookup) -> Result<ResolvedTag, SnapError> {
        self.record(RepositoryCall::ResolveTag {
            name: name.to_owned(),
            lookup,
        });

        self.tags
            .iter()
            .find(|tag| tag.as_str() == name)
            .map(|tag| ResolvedTag {
                name: tag.clone(),
                object_id: Oid::zero(),
                target_id: Oid::zero(),
            })
            .ok_or_else(|| SnapError::tag_not_found(name))
    }

    fn checkout_tag(
        &self,
        tag: &ResolvedTag,
        strategy: CheckoutStrategy,
    ) -> Result<(), SnapError> {
        self.record(RepositoryCall::CheckoutTag {
            name: tag.name.clone(),
            strategy,
        });

        if let Some(message) = self.checkout_error.as_ref() {
            return Err(SnapError::checkout_failed(&tag.name, message));
        }
        Ok(())
    }
}
