//! Command: report working tree and branch state.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::status::StatusReport;

/// Print the child's status.
///
/// Git failures are reported inline; the command itself only fails when the
/// configuration cannot be loaded.
///
/// # Errors
///
/// Returns an error if the root or configuration cannot be resolved.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    StatusReport::collect(&setup.config, &SystemExecutor).render(log);
    Ok(())
}
