//! Configuration validation logic

use crate::config::Config;
use crate::error::SnapError;
use crate::git::tag_reference;
use anyhow::Result;
use regex::Regex;

/// Validate a merged configuration
///
/// # Errors
///
/// Returns a configuration error if:
/// - The repository path is empty
/// - The tag is empty or not a valid tag reference name
/// - The remote name is invalid
/// - There are no refspecs, or a refspec is malformed
#[inline]
pub fn validate_config(config: &Config) -> Result<()> {
    if config.repo_path.as_os_str().is_empty() {
        return Err(SnapError::configuration("Repository path cannot be empty").into());
    }

    validate_tag(&config.tag)?;
    validate_remote(&config.remote)?;

    if config.refspecs.is_empty() {
        return Err(SnapError::configuration("At least one refspec is required").into());
    }
    for refspec in &config.refspecs {
        validate_refspec(refspec)?;
    }

    Ok(())
}

/// Validate a tag name
///
/// # Errors
///
/// Returns an error if the tag is empty or `refs/tags/<tag>` is not a valid
/// reference name
#[inline]
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(SnapError::configuration("Tag cannot be empty").into());
    }

    if tag.contains('\0') || !git2::Reference::is_valid_name(&tag_reference(tag)) {
        return Err(SnapError::configuration(format!("Invalid tag name: '{tag}'")).into());
    }

    Ok(())
}

/// Validate a remote name
///
/// # Errors
///
/// Returns an error if the name is empty or contains characters git does not
/// allow in remote names
#[inline]
pub fn validate_remote(remote: &str) -> Result<()> {
    let regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$")?;
    if !regex.is_match(remote) {
        return Err(SnapError::configuration(format!("Invalid remote name: '{remote}'")).into());
    }
    Ok(())
}

/// Validate a fetch refspec of the form `[+]<src>:<dst>`
///
/// # Errors
///
/// Returns an error if the refspec does not have that shape
#[inline]
pub fn validate_refspec(refspec: &str) -> Result<()> {
    let regex = Regex::new(r"^\+?refs/[^\s:]+:refs/[^\s:]+$")?;
    if !regex.is_match(refspec) {
        return Err(SnapError::configuration(format!(
            "Invalid refspec: '{refspec}'\n\
            Expected format: [+]refs/<source>:refs/<destination>"
        ))
        .into());
    }
    Ok(())
}
