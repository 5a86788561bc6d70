//! # `TagSnap`
//!
//! `TagSnap` produces a reproducible, minimal on-disk snapshot of a tagged
//! release. It fetches the repository's remote, checks out the tag, and prunes
//! the working tree down to the entries listed in `.git/info/sparse-checkout`.
//!
//! ## Usage
//!
//! ```sh
//! tagsnap --repopath /srv/app --tag v1.2.0 --sshpath ~/.ssh/deploy
//! ```
//!
//! Settings can also come from a `tagsnap.yaml` file; see `tagsnap --help`.

use anyhow::Result;
use clap::Parser as _;
use tagsnap::cli::Args;
use tagsnap::error::SnapError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber based on verbose flag
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    match tagsnap::run(&args) {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<SnapError>()
                    .map_or(1, SnapError::exit_code),
            );
        }
    }
}
