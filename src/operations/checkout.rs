//! Tag checkout session coordination

use crate::config::Config;
use crate::error::SnapError;
use crate::git::{
    PruneOutcome, ResolvedTag, SparsePruner, SshCredentials, TagRepository,
};
use crate::system::System;
use core::fmt;
use tracing::{debug, info};

/// Progress of a checkout session
///
/// Steps only move forward; a failed step ends the session in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    Fetched,
    TagResolved,
    CheckedOut,
    Pruned,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Opened => "opened",
            Self::Fetched => "fetched",
            Self::TagResolved => "tag-resolved",
            Self::CheckedOut => "checked-out",
            Self::Pruned => "pruned",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReport {
    pub tag: String,
    /// Commit the working directory now reflects
    pub commit: String,
    pub prune: PruneOutcome,
}

/// Runs fetch, tag resolution, checkout and sparse prune against one
/// repository, strictly in that order
#[non_exhaustive]
pub struct TagCheckout<'src, R: TagRepository> {
    config: Config,
    credentials: SshCredentials,
    repository: R,
    system: &'src dyn System,
    state: SessionState,
    resolved: Option<ResolvedTag>,
}

impl<'src, R: TagRepository> TagCheckout<'src, R> {
    /// Start a session on an opened repository
    #[inline]
    pub fn new(config: Config, repository: R, system: &'src dyn System) -> Self {
        let credentials = config.credentials();
        Self {
            config,
            credentials,
            repository,
            system,
            state: SessionState::Opened,
            resolved: None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    #[inline]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// End the session and hand back the repository
    #[inline]
    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Fetch the configured refspecs from the remote
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session was just opened; otherwise the
    /// repository's fetch error
    #[inline]
    pub fn fetch(&mut self) -> Result<(), SnapError> {
        self.step("fetch", SessionState::Opened, SessionState::Fetched, |session| {
            info!("Fetching from {}", session.config.remote);
            session.repository.fetch(
                &session.config.remote,
                &session.config.refspecs,
                &session.credentials,
            )
        })
    }

    /// Resolve the configured tag
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the fetch has run; otherwise `TagNotFound` or
    /// `ObjectDatabase`
    #[inline]
    pub fn resolve_tag(&mut self) -> Result<ResolvedTag, SnapError> {
        self.step(
            "resolve tag",
            SessionState::Fetched,
            SessionState::TagResolved,
            |session| {
                let tag = session
                    .repository
                    .resolve_tag(&session.config.tag, session.config.tag_lookup)?;
                info!("Found tag {} at commit {}", tag.name, tag.target_id);
                session.resolved = Some(tag.clone());
                Ok(tag)
            },
        )
    }

    /// Check out the resolved tag and move HEAD to it
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the tag was resolved; otherwise
    /// `CheckoutFailed` or `HeadUpdateFailed`
    #[inline]
    pub fn checkout(&mut self) -> Result<(), SnapError> {
        self.step(
            "check out",
            SessionState::TagResolved,
            SessionState::CheckedOut,
            |session| {
                let tag = session
                    .resolved
                    .as_ref()
                    .ok_or_else(|| SnapError::invalid_state("check out", "without a tag"))?;
                session
                    .repository
                    .checkout_tag(tag, session.config.checkout_strategy)?;
                info!("Checked out {}", tag.reference());
                Ok(())
            },
        )
    }

    /// Prune the working directory to the sparse-checkout allowlist
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the checkout succeeded; otherwise
    /// `MetadataNotFound` or `PruneIoFailed`. A prune error means the
    /// checkout itself succeeded.
    #[inline]
    pub fn prune(&mut self) -> Result<PruneOutcome, SnapError> {
        self.step("prune", SessionState::CheckedOut, SessionState::Pruned, |session| {
            SparsePruner::new(session.system, session.repository.workdir())
                .dry_run(session.config.dry_run)
                .prune()
        })
    }

    /// Run every step in order
    ///
    /// # Errors
    ///
    /// The first failing step's error; later steps do not run
    #[inline]
    pub fn execute(&mut self) -> Result<CheckoutReport, SnapError> {
        self.fetch()?;
        let tag = self.resolve_tag()?;
        self.checkout()?;
        let prune = self.prune()?;

        Ok(CheckoutReport {
            tag: tag.name,
            commit: tag.target_id.to_string(),
            prune,
        })
    }

    fn step<T>(
        &mut self,
        operation: &str,
        expected: SessionState,
        next: SessionState,
        run: impl FnOnce(&mut Self) -> Result<T, SnapError>,
    ) -> Result<T, SnapError> {
        if self.state != expected {
            return Err(SnapError::invalid_state(operation, self.state));
        }

        match run(self) {
            Ok(value) => {
                debug!("Session {} -> {next}", self.state);
                self.state = next;
                Ok(value)
            }
            Err(err) => {
                debug!("Session {} -> {} ({err})", self.state, SessionState::Failed);
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }
}
