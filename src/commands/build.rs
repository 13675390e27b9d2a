//! Command: build the gem package.
use anyhow::{Result, bail};

use crate::cli::GlobalOpts;
use crate::config::ChildConfig;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};

/// Build the gem from the child's gemspec.
///
/// # Errors
///
/// Returns an error if there is no gemspec or `gem build` fails.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    execute(&setup.config, &SystemExecutor, log)
}

/// Run `gem build` on the first gemspec in the child root.
///
/// # Errors
///
/// Returns an error if there is no gemspec, `gem` cannot be started, or the
/// build exits non-zero.
pub fn execute(config: &ChildConfig, executor: &dyn Executor, log: &dyn Log) -> Result<()> {
    let Some(gemspec) = super::init::first_gemspec(&config.root)? else {
        bail!("no .gemspec file found in {}", config.root.display());
    };
    let file_name = gemspec
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

    log.stage(&format!("Building {file_name}"));
    if !executor.run_streaming_in(&config.root, "gem", &["build", &file_name])? {
        bail!("gem build {file_name} failed");
    }
    log.info("build complete");
    Ok(())
}
