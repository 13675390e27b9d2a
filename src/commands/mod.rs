//! Top-level subcommand handlers.
pub mod build;
pub mod init;
pub mod status;
pub mod symlink_build;
pub mod update;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::ChildConfig;
use crate::logging::Logger;

/// Environment variable that overrides the repository root.
pub const ROOT_ENV: &str = "SUBMODULER_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Resolves the repository root and loads and validates the child's
/// configuration so that each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The child's configuration; `config.root` is the repository root.
    pub config: ChildConfig,
}

impl CommandSetup {
    /// Resolve the root and load `.submoduler.ini`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved, the configuration is
    /// missing or unparseable, or it does not describe a child.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));

        let config = ChildConfig::load(&root)?;
        config.validate_child()?;
        log.debug(&format!(
            "child: {}",
            config.child_name().unwrap_or_default()
        ));
        log.debug(&format!("parent: {}", config.parent_root().display()));

        Ok(Self { config })
    }
}

/// Resolve the repository root: `--root`, then `$SUBMODULER_ROOT`, then the
/// current directory.  The result is canonicalised.
///
/// # Errors
///
/// Returns an error if the chosen directory does not exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => match std::env::var(ROOT_ENV) {
            Ok(root) if !root.is_empty() => PathBuf::from(root),
            _ => std::env::current_dir().context("reading current directory")?,
        },
    };
    dunce::canonicalize(&root).with_context(|| format!("resolving root {}", root.display()))
}

/// Run the handler for the parsed command line.
///
/// # Errors
///
/// Returns the handler's error.
pub fn dispatch(cli: &Cli, log: &Logger) -> Result<()> {
    match &cli.command {
        Command::Init(opts) => init::run(&cli.global, opts, log),
        Command::Status => status::run(&cli.global, log),
        Command::Test(opts) => test::run(&cli.global, opts, log),
        Command::Version(opts) => version::run(&cli.global, opts, log),
        Command::Build => build::run(&cli.global, log),
        Command::SymlinkBuild => symlink_build::run(&cli.global, log),
        Command::Update(opts) => update::run(&cli.global, opts, log),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn resolve_root_uses_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
        };
        assert_eq!(
            resolve_root(&global).unwrap(),
            dunce::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn resolve_root_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().join("missing")),
        };
        let err = resolve_root(&global).unwrap_err();
        assert!(err.to_string().contains("resolving root"), "got: {err}");
    }

    #[test]
    fn setup_fails_outside_a_child() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
        };
        let err = CommandSetup::init(&global, &Logger::new("test")).unwrap_err();
        assert!(
            err.to_string().contains("Not in a Submoduler directory"),
            "got: {err}"
        );
    }

    #[test]
    fn setup_rejects_parent_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            ChildConfig::path(dir.path()),
            "[submoduler]\nchildname = core\ntype = parent\n",
        )
        .unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
        };
        assert!(CommandSetup::init(&global, &Logger::new("test")).is_err());
    }
}
