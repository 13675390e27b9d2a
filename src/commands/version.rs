//! Command: show or bump the child's version.
use anyhow::Result;

use crate::cli::{GlobalOpts, VersionOpts};
use crate::config::ChildConfig;
use crate::logging::{Log, Logger};
use crate::version::{BumpKind, VersionFile};

/// Print the current version, or bump it when `--bump` is given.
///
/// # Errors
///
/// Returns an error if the configuration or version file cannot be read, or
/// the bumped version cannot be written.
pub fn run(global: &GlobalOpts, opts: &VersionOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    execute(&setup.config, opts.bump, log)
}

/// Report or bump the version of the child described by `config`.
///
/// # Errors
///
/// Returns an error if no version file exists or it cannot be parsed or
/// written.
pub fn execute(config: &ChildConfig, bump: Option<BumpKind>, log: &dyn Log) -> Result<()> {
    let file = VersionFile::locate(config)?;
    let shown = file
        .path
        .strip_prefix(&config.root)
        .unwrap_or(file.path.as_path())
        .display()
        .to_string();
    let name = config.child_name().unwrap_or_default();

    if let Some(kind) = bump {
        let (old, new) = file.bump(kind)?;
        log.info(&format!("{name} {old} → {new}"));
        log.info(&format!("updated {shown}"));
    } else {
        log.info(&format!("{name} {}", file.read()?));
        log.info(&format!("read from {shown}"));
    }
    Ok(())
}
