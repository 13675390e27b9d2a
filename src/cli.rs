//! Command-line interface definition.
use clap::{Parser, Subcommand};

use crate::version::BumpKind;

/// Top-level CLI entry point for the child submodule helper.
#[derive(Parser, Debug)]
#[command(
    name = "submoduler_child",
    about = "Manage a Submoduler child submodule",
    version = option_env!("SUBMODULER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")),
    arg_required_else_help = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Repository root (defaults to $SUBMODULER_ROOT, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create .submoduler.ini and the standard directories
    Init(InitOpts),
    /// Show working tree and branch status
    Status,
    /// Run the test suite
    Test(TestOpts),
    /// Show or bump the version
    Version(VersionOpts),
    /// Build the gem
    Build,
    /// Link steering documents from the parent repository
    #[command(name = "symlink_build", alias = "symlink-build")]
    SymlinkBuild,
    /// Test, commit, bump, push, and optionally release
    Update(UpdateOpts),
}

impl Command {
    /// Subcommand name as typed on the command line; also names the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Status => "status",
            Self::Test(_) => "test",
            Self::Version(_) => "version",
            Self::Build => "build",
            Self::SymlinkBuild => "symlink_build",
            Self::Update(_) => "update",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InitOpts {
    /// Child name (defaults to the gemspec name, then the directory name)
    #[arg(long)]
    pub name: Option<String>,
}

/// Options for the `test` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct TestOpts {
    /// Extra arguments passed to the test runner (after `--`)
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Options for the `version` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct VersionOpts {
    /// Increment a version component and write it back
    #[arg(long, value_enum)]
    pub bump: Option<BumpKind>,
}

/// Options for the `update` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UpdateOpts {
    /// Commit message for outstanding changes
    #[arg(short, long)]
    pub message: String,

    /// Create a GitHub release for the latest tag (needs GITHUB_TOKEN)
    #[arg(long)]
    pub release: bool,
}
