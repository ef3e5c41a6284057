//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use stdver::util::Config;

/// stdver - Version identity and resolution for the Go standard library
#[derive(Parser)]
#[command(name = "stdver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// History source selection, overriding the config files.
#[derive(Args)]
pub struct SourceArgs {
    /// History backend (remote, local, fixture)
    #[arg(long, global = true, env = "STDVER_BACKEND")]
    pub backend: Option<String>,

    /// Repository URL for the remote backend
    #[arg(long, global = true, env = "STDVER_URL")]
    pub url: Option<String>,

    /// Existing clone for the local backend
    #[arg(long, global = true, env = "STDVER_LOCAL_PATH")]
    pub local_path: Option<PathBuf>,

    /// Directory of per-ref snapshots for the fixture backend
    #[arg(long, global = true, env = "STDVER_FIXTURE_DIR")]
    pub fixture_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Apply the flags on top of `config` (flags take precedence).
    pub fn apply(self, config: &mut Config) {
        if self.backend.is_some() {
            config.source.backend = self.backend;
        }
        if self.url.is_some() {
            config.source.url = self.url;
        }
        if self.local_path.is_some() {
            config.source.local_path = self.local_path;
        }
        if self.fixture_dir.is_some() {
            config.source.fixture_dir = self.fixture_dir;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the released versions, newest first
    Versions(VersionsArgs),

    /// Show the heads of the supported branches
    Branches(BranchesArgs),

    /// Resolve a requested version to a commit
    Resolve(ResolveArgs),

    /// Build the module zip for a version
    Zip(ZipArgs),

    /// Clone the ref holding a version
    Clone(CloneArgs),

    /// Map a version to its release tag, or a tag to its version
    Tag(TagArgs),

    /// Print the sort key of each version
    SortKey(SortKeyArgs),

    /// Print the latest of the given versions
    Latest(LatestArgs),

    /// Classify a version as release, prerelease or pseudo
    Classify(ClassifyArgs),
}

#[derive(Args)]
pub struct VersionsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BranchesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Requested version (semver, tag, branch or "latest")
    pub version: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ZipArgs {
    /// Requested version (semver, tag, branch or "latest")
    pub version: String,

    /// Output file (defaults to std@<version>.zip)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the archive entries instead of writing the archive
    #[arg(long)]
    pub list: bool,
}

#[derive(Args)]
pub struct CloneArgs {
    /// Requested version (semver, tag, branch or "latest")
    pub version: String,

    /// Destination directory
    pub dest: PathBuf,
}

#[derive(Args)]
pub struct TagArgs {
    /// Version to map (or tag, with --reverse)
    pub value: String,

    /// Map a tag to its version
    #[arg(long)]
    pub reverse: bool,
}

#[derive(Args)]
pub struct SortKeyArgs {
    /// Versions to encode
    #[arg(required = true)]
    pub versions: Vec<String>,
}

#[derive(Args)]
pub struct LatestArgs {
    /// Candidate versions
    #[arg(required = true)]
    pub versions: Vec<String>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Version to classify
    pub version: String,
}
