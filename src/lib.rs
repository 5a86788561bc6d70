//! `TagSnap` - Check out a git tag onto disk and prune it to a sparse allowlist
//!
//! This library fetches a repository's remote, resolves a tag, writes the
//! tag's tree into the working directory and then deletes every top-level
//! entry not listed in `.git/info/sparse-checkout`.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod operations;
pub mod system;

use anyhow::Result;
use cli::Args;
use config::Config;
use git::{GitRepository, PruneOutcome};
use operations::{CheckoutReport, TagCheckout};
use system::RealSystem;
use tracing::info;

/// Main entry point for the tagsnap library
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any step of the
/// checkout session fails. The underlying [`error::SnapError`] can be
/// recovered with `downcast_ref`.
pub fn run(args: &Args) -> Result<CheckoutReport> {
    let system = RealSystem::new();
    let config = Config::from_args(&system, args)?;

    info!(
        "Searching {} for git tag {}",
        config.repo_path.display(),
        config.tag
    );

    let repository = GitRepository::open(&config.repo_path)?.show_progress(config.show_progress);
    let mut session = TagCheckout::new(config, repository, &system);
    let report = session.execute()?;
    session.into_repository().close();

    info!("\u{2713} Checked out tag {} at {}", report.tag, report.commit);
    match &report.prune {
        PruneOutcome::Skipped(reason) => info!("  Sparse prune skipped: {reason}"),
        PruneOutcome::Pruned(prune) => {
            let verb = if prune.dry_run { "Would remove" } else { "Removed" };
            info!(
                "  {verb} {} entries ({} files), kept {}",
                prune.removed.len(),
                prune.files_removed,
                prune.kept.len()
            );
        }
    }

    Ok(report)
}
