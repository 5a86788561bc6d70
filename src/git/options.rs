//! Checkout strategy and tag lookup options

use core::fmt;
use core::str::FromStr;
use git2::build::CheckoutBuilder;
use serde::{Deserialize, Serialize};

/// How the tag's tree is written over the working directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStrategy {
    /// Recreate missing files and resolve every conflict with the incoming
    /// content; local edits to tracked files are discarded, untracked files
    /// the tag does not touch are kept
    #[default]
    Theirs,
    /// Overwrite every modified file unconditionally
    Force,
    /// Plain safe checkout; conflicts abort the checkout
    Safe,
}

impl CheckoutStrategy {
    /// Build the libgit2 checkout options for this strategy
    #[must_use]
    #[inline]
    pub fn builder(self) -> CheckoutBuilder<'static> {
        let mut builder = CheckoutBuilder::new();
        match self {
            Self::Theirs => {
                // SAFE alone skips conflicting paths and still reports success
                builder
                    .force()
                    .recreate_missing(true)
                    .allow_conflicts(true)
                    .use_theirs(true);
            }
            Self::Force => {
                builder.force();
            }
            Self::Safe => {
                builder.safe();
            }
        }
        builder
    }
}

impl fmt::Display for CheckoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Theirs => "theirs",
            Self::Force => "force",
            Self::Safe => "safe",
        };
        f.write_str(name)
    }
}

impl FromStr for CheckoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theirs" => Ok(Self::Theirs),
            "force" => Ok(Self::Force),
            "safe" => Ok(Self::Safe),
            other => Err(format!(
                "Invalid checkout strategy '{other}'. Must be 'theirs', 'force' or 'safe'"
            )),
        }
    }
}

/// How a tag name is resolved to a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagLookup {
    /// Scan every object in the object database for an annotated tag
    #[default]
    Scan,
    /// Read `refs/tags/<name>` directly; also finds lightweight tags
    Reference,
}

impl fmt::Display for TagLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Scan => "scan",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

impl FromStr for TagLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(Self::Scan),
            "reference" => Ok(Self::Reference),
            other => Err(format!(
                "Invalid tag lookup '{other}'. Must be 'scan' or 'reference'"
            )),
        }
    }
}
