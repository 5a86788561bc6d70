//! YAML configuration loading and parsing

use crate::config::FileConfig;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::path::Path;

/// Load, schema-check and parse a YAML configuration file
///
/// An empty file is treated as an empty configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, or does not
/// match the configuration schema
#[inline]
pub fn load_file_config(system: &dyn System, path: &Path) -> Result<FileConfig> {
    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    parse_file_config(&content)
        .with_context(|| format!("Invalid configuration file: {}", path.display()))
}

/// Parse YAML configuration content
///
/// # Errors
///
/// Returns an error if the content is not valid YAML or does not match the
/// configuration schema
#[inline]
pub fn parse_file_config(content: &str) -> Result<FileConfig> {
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    let value: Value = serde_yaml::from_str(content).context(
        "Failed to parse YAML configuration\n\
        Please check the syntax and structure of your configuration file",
    )?;

    if value.is_null() {
        return Ok(FileConfig::default());
    }

    crate::config::schema::validate_against_schema(&value)?;

    serde_json::from_value(value).context("Failed to read configuration values")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{CheckoutStrategy, TagLookup};

    #[test]
    fn test_parse_camel_case_keys() {
        let config = parse_file_config(
            r#"
repoPath: /srv/app
tag: v1.2.0
sshPath: ~/.ssh/deploy
checkoutStrategy: force
tagLookup: reference
trustAllCertificates: false
"#,
        )
        .unwrap();

        assert_eq!(config.repo_path.as_deref(), Some("/srv/app"));
        assert_eq!(config.tag.as_deref(), Some("v1.2.0"));
        assert_eq!(config.ssh_path.as_deref(), Some("~/.ssh/deploy"));
        assert_eq!(config.checkout_strategy, Some(CheckoutStrategy::Force));
        assert_eq!(config.tag_lookup, Some(TagLookup::Reference));
        assert_eq!(config.trust_all_certificates, Some(false));
        assert!(config.refspecs.is_none());
    }

    #[test]
    fn test_empty_content_is_empty_config() {
        assert_eq!(parse_file_config("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = parse_file_config("tag: [unclosed").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse YAML"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_file_config("tag: v1\nbranch: main\n").unwrap_err();
        assert!(format!("{err:#}").contains("Configuration validation failed"));
    }
}
