//! Custom error types with exit codes

use std::path::Path;
use thiserror::Error;

/// Main error type for tagsnap operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapError {
    /// Configuration Error - missing or invalid configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The repository path could not be opened as a git repository
    #[error("Failed to open repository '{path}': {message}")]
    OpenFailed { path: String, message: String },

    /// The named remote is not configured on the repository
    #[error("Remote '{remote}' not found: {message}")]
    RemoteNotFound { remote: String, message: String },

    /// Network or authentication failure while fetching
    #[error("Failed to fetch from '{remote}': {message}")]
    FetchFailed { remote: String, message: String },

    /// Enumerating the object database failed before the tag was found
    #[error("Object database error: {message}")]
    ObjectDatabase { message: String },

    /// No tag with exactly this name exists
    #[error("Tag '{tag}' not found")]
    TagNotFound { tag: String },

    /// Commit, tree or working-directory checkout failed
    #[error("Failed to check out tag '{tag}': {message}")]
    CheckoutFailed { tag: String, message: String },

    /// HEAD could not be moved to the tag reference
    #[error("Failed to update HEAD to '{reference}': {message}")]
    HeadUpdateFailed { reference: String, message: String },

    /// A session step was invoked out of order
    #[error("Cannot {operation} while session is {state}")]
    InvalidState { operation: String, state: String },

    /// The `.git` directory is missing under the working directory
    #[error("Repository metadata not found: '{path}' has no .git entry")]
    MetadataNotFound { path: String },

    /// Listing, reading or deleting during the prune failed
    #[error("Prune failed at '{path}': {message}")]
    PruneIoFailed { path: String, message: String },
}

impl SnapError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::OpenFailed { .. } => 2,
            Self::RemoteNotFound { .. } | Self::FetchFailed { .. } => 3,
            Self::ObjectDatabase { .. } | Self::TagNotFound { .. } => 4,
            Self::CheckoutFailed { .. } | Self::HeadUpdateFailed { .. } => 5,
            Self::InvalidState { .. } => 6,
            Self::MetadataNotFound { .. } | Self::PruneIoFailed { .. } => 7,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an open error for a repository path
    #[inline]
    pub fn open_failed<M: ToString>(path: &Path, message: M) -> Self {
        Self::OpenFailed {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn remote_not_found<M: ToString>(remote: &str, message: M) -> Self {
        Self::RemoteNotFound {
            remote: remote.to_owned(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn fetch_failed<M: ToString>(remote: &str, message: M) -> Self {
        Self::FetchFailed {
            remote: remote.to_owned(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn object_database<M: ToString>(message: M) -> Self {
        Self::ObjectDatabase {
            message: message.to_string(),
        }
    }

    /// Create a tag-not-found error
    #[inline]
    pub fn tag_not_found<S: Into<String>>(tag: S) -> Self {
        Self::TagNotFound { tag: tag.into() }
    }

    #[inline]
    pub fn checkout_failed<M: ToString>(tag: &str, message: M) -> Self {
        Self::CheckoutFailed {
            tag: tag.to_owned(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn head_update_failed<M: ToString>(reference: &str, message: M) -> Self {
        Self::HeadUpdateFailed {
            reference: reference.to_owned(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn invalid_state<O: Into<String>, S: ToString>(operation: O, state: S) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }

    /// Create a missing-metadata error for a working directory
    #[inline]
    pub fn metadata_not_found(workdir: &Path) -> Self {
        Self::MetadataNotFound {
            path: workdir.display().to_string(),
        }
    }

    /// Create a prune I/O error for the path being processed
    #[inline]
    pub fn prune_io(path: &Path, error: &std::io::Error) -> Self {
        Self::PruneIoFailed {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}
