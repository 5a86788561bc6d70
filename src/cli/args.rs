use clap::Parser;

/// Command-line arguments for tagsnap
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tagsnap")]
#[command(
    about = "Check out a git tag onto disk and prune the working tree to its sparse-checkout allowlist"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Path to the repository to check out into
    #[arg(long, value_name = "PATH", env = "TAGSNAP_REPOPATH")]
    pub repopath: Option<String>,

    /// Git tag to check out
    #[arg(long, value_name = "NAME", env = "TAGSNAP_TAG")]
    pub tag: Option<String>,

    /// Directory holding the id_rsa / id_rsa.pub key pair for the remote
    #[arg(long, value_name = "PATH", env = "TAGSNAP_SSHPATH")]
    pub sshpath: Option<String>,

    /// Configuration file path (defaults to ./tagsnap.yaml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Remote to fetch from
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// How local changes are treated when the tag is checked out
    #[arg(
        long = "checkout-strategy",
        value_name = "STRATEGY",
        value_parser = ["theirs", "force", "safe"]
    )]
    pub checkout_strategy: Option<String>,

    /// How the tag is located: object database scan or tag reference
    #[arg(
        long = "tag-lookup",
        value_name = "LOOKUP",
        value_parser = ["scan", "reference"]
    )]
    pub tag_lookup: Option<String>,

    /// Validate remote certificates instead of trusting all of them
    #[arg(long = "verify-certificates")]
    pub verify_certificates: bool,

    /// Report which entries would be pruned without deleting them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the fetch progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
