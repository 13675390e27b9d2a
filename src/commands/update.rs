//! Command: run the full update workflow.
use anyhow::{Result, bail};

use crate::cli::{GlobalOpts, UpdateOpts};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::release::{GitHubReleases, ReleasePublisher};
use crate::workflow::{self, Context, UpdateOptions};

/// Test, commit, bump, push, and optionally release.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or any workflow
/// step fails.
pub fn run(global: &GlobalOpts, opts: &UpdateOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let options = UpdateOptions {
        message: opts.message.clone(),
        release: opts.release,
    };
    let github = if opts.release {
        GitHubReleases::from_env()
    } else {
        None
    };

    let ctx = Context {
        config: &setup.config,
        executor: &SystemExecutor,
        log,
        publisher: github.as_ref().map(|g| g as &dyn ReleasePublisher),
        options: &options,
    };
    let outcome = workflow::run(&workflow::steps(opts.release), &ctx);
    log.print_summary();

    if let Some(failed) = outcome.failure() {
        bail!("update failed at step: {}", failed.name);
    }
    log.info("Update complete");
    Ok(())
}
