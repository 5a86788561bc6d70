//! Configuration management module
//!
//! Merges the optional YAML configuration file with command-line flags and
//! validates the result

pub mod schema;
pub mod validation;
pub mod yaml;

use crate::cli::Args;
use crate::error::SnapError;
use crate::git::{CheckoutStrategy, SshCredentials, TagLookup};
use crate::system::System;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file picked up from the current directory when present
pub const DEFAULT_CONFIG_FILE: &str = "tagsnap.yaml";

/// Remote fetched when none is configured
pub const DEFAULT_REMOTE: &str = "origin";

/// Tag refspec fetched when no refspecs are configured
pub const DEFAULT_TAG_REFSPEC: &str = "refs/tags/*:refs/tags/*";

/// Refspecs fetched from `remote` when none are configured
///
/// Branches land under `refs/remotes/<remote>/`, tags under `refs/tags/`.
#[must_use]
#[inline]
pub fn default_refspecs(remote: &str) -> Vec<String> {
    vec![
        format!("+refs/heads/*:refs/remotes/{remote}/*"),
        DEFAULT_TAG_REFSPEC.to_owned(),
    ]
}

/// Contents of a configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refspecs: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_all_certificates: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_strategy: Option<CheckoutStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_lookup: Option<TagLookup>,
}

/// Fully resolved settings for one checkout run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Repository to open; its working directory is pruned
    pub repo_path: PathBuf,

    /// Tag to check out
    pub tag: String,

    /// Directory holding `id_rsa` and `id_rsa.pub`; empty when unset
    pub ssh_path: PathBuf,

    pub remote: String,

    pub refspecs: Vec<String>,

    /// Accept remote certificates without validation
    pub trust_all_certificates: bool,

    pub checkout_strategy: CheckoutStrategy,

    pub tag_lookup: TagLookup,

    /// Report prunable entries instead of deleting them
    pub dry_run: bool,

    /// Draw a progress bar during the fetch
    pub show_progress: bool,
}

impl Config {
    /// Create a configuration with defaults for everything but the
    /// repository and tag
    #[must_use]
    #[inline]
    pub fn new<P: Into<PathBuf>, S: Into<String>>(repo_path: P, tag: S) -> Self {
        Self {
            repo_path: repo_path.into(),
            tag: tag.into(),
            ssh_path: PathBuf::new(),
            remote: DEFAULT_REMOTE.to_owned(),
            refspecs: default_refspecs(DEFAULT_REMOTE),
            trust_all_certificates: true,
            checkout_strategy: CheckoutStrategy::default(),
            tag_lookup: TagLookup::default(),
            dry_run: false,
            show_progress: true,
        }
    }

    /// Build the configuration from CLI arguments and the configuration file
    ///
    /// The file named by `--config` is required to exist. Without `--config`,
    /// `tagsnap.yaml` in the current directory is used if present. Command-line
    /// values take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file is missing, unreadable or invalid
    /// - The repository path or tag is given neither on the command line nor in the file
    /// - `~` cannot be expanded because there is no home directory
    /// - The merged configuration fails validation
    #[inline]
    pub fn from_args(system: &dyn System, args: &Args) -> Result<Self> {
        let file = match args.config.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                if !system.exists(path) {
                    return Err(SnapError::configuration(format!(
                        "Configuration file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                yaml::load_file_config(system, path)?
            }
            None => {
                let default_path = system.current_dir()?.join(DEFAULT_CONFIG_FILE);
                if system.is_file(&default_path) {
                    debug!("Using configuration file {}", default_path.display());
                    yaml::load_file_config(system, &default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let config = Self::merge(system, args, file)?;
        validation::validate_config(&config)?;
        debug!("Configuration: {config:?}");
        Ok(config)
    }

    /// Merge CLI arguments over file values
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing, a strategy name is
    /// unknown, or `~` cannot be expanded
    #[inline]
    pub fn merge(system: &dyn System, args: &Args, file: FileConfig) -> Result<Self> {
        let repo_path = args.repopath.clone().or(file.repo_path).ok_or_else(|| {
            SnapError::configuration(
                "No repository path given. Use --repopath or set repoPath in the configuration file",
            )
        })?;
        let tag = args.tag.clone().or(file.tag).ok_or_else(|| {
            SnapError::configuration(
                "No tag given. Use --tag or set tag in the configuration file",
            )
        })?;
        let ssh_path = args.sshpath.clone().or(file.ssh_path).unwrap_or_default();

        let mut config = Self::new(expand_home(system, &repo_path)?, tag);
        config.ssh_path = expand_home(system, &ssh_path)?;

        if let Some(remote) = args.remote.clone().or(file.remote) {
            config.refspecs = default_refspecs(&remote);
            config.remote = remote;
        }
        if let Some(refspecs) = file.refspecs {
            config.refspecs = refspecs;
        }
        if let Some(trust) = file.trust_all_certificates {
            config.trust_all_certificates = trust;
        }
        if args.verify_certificates {
            config.trust_all_certificates = false;
        }

        config.checkout_strategy = match args.checkout_strategy.as_deref() {
            Some(name) => name.parse().map_err(SnapError::configuration)?,
            None => file.checkout_strategy.unwrap_or_default(),
        };
        config.tag_lookup = match args.tag_lookup.as_deref() {
            Some(name) => name.parse().map_err(SnapError::configuration)?,
            None => file.tag_lookup.unwrap_or_default(),
        };

        config.dry_run = args.dry_run;
        config.show_progress = !args.quiet;

        Ok(config)
    }

    /// Credentials for fetching from the remote
    #[must_use]
    #[inline]
    pub fn credentials(&self) -> SshCredentials {
        SshCredentials::new(&self.ssh_path).trust_all_certificates(self.trust_all_certificates)
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(system: &dyn System, path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };

    let home = system.home_dir().ok_or_else(|| {
        SnapError::configuration(format!(
            "Cannot determine home directory for ~ expansion of '{path}'"
        ))
    })?;

    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn test_expand_home() {
        let system = MockSystem::new().with_home("/home/deploy").unwrap();

        assert_eq!(
            expand_home(&system, "~/.ssh").unwrap(),
            PathBuf::from("/home/deploy/.ssh")
        );
        assert_eq!(expand_home(&system, "~").unwrap(), PathBuf::from("/home/deploy"));
        assert_eq!(expand_home(&system, "~other/x").unwrap(), PathBuf::from("~other/x"));
        assert_eq!(expand_home(&system, "").unwrap(), PathBuf::new());
    }

    #[test]
    fn test_expand_home_without_home() {
        let system = MockSystem::new();
        assert!(expand_home(&system, "~/.ssh").is_err());
        assert_eq!(expand_home(&system, "/keys").unwrap(), PathBuf::from("/keys"));
    }

    #[test]
    fn test_credentials_follow_config() {
        let mut config = Config::new("/repo", "v1");
        config.ssh_path = PathBuf::from("/keys");
        config.trust_all_certificates = false;

        let credentials = config.credentials();
        assert_eq!(credentials.private_key_path(), PathBuf::from("/keys/id_rsa"));
    }
}
