//! The [`Logger`] handed to every command.
use std::path::PathBuf;
use std::sync::Mutex;

use super::STAGE_TARGET;
use super::file::log_file_path;
use super::types::{Log, StepEntry, StepStatus, StepTally};

/// Emits [`tracing`] events and collects step results for the closing
/// summary.
///
/// Output formatting and the log file are owned by the subscriber from
/// [`init_subscriber`](super::init_subscriber); without one installed the
/// messages go nowhere and only the step records remain.
#[derive(Debug)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for one run of `command`; remembers where its log file lives.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            steps: Mutex::default(),
            log_file: log_file_path(command),
        }
    }

    /// Path of this run's log file, if the cache directory is usable.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded steps, in order.
    #[must_use]
    pub fn step_entries(&self) -> Vec<StepEntry> {
        self.steps.lock().map(|steps| steps.clone()).unwrap_or_default()
    }

    /// Section header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Progress line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Detail shown with `--verbose` and always kept in the log file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Non-fatal problem.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Fatal problem.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Add a step result to the summary.
    pub fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(StepEntry {
                name: name.to_owned(),
                status,
                message: message.map(str::to_owned),
            });
        }
    }

    /// Number of failed steps so far.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        StepTally::of(&self.step_entries()).failed
    }

    /// Print every recorded step with its icon, then the totals and the log
    /// file location.  Does nothing when no steps were recorded.
    pub fn print_summary(&self) {
        let steps = self.step_entries();
        if steps.is_empty() {
            return;
        }

        self.stage("Summary");
        for step in &steps {
            let detail = step
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            self.info(&format!(
                "{}{} {}{detail}\x1b[0m",
                step.status.color(),
                step.status.icon(),
                step.name
            ));
        }
        self.info(&StepTally::of(&steps).to_string());

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        Self::stage(self, msg);
    }

    fn info(&self, msg: &str) {
        Self::info(self, msg);
    }

    fn debug(&self, msg: &str) {
        Self::debug(self, msg);
    }

    fn warn(&self, msg: &str) {
        Self::warn(self, msg);
    }

    fn error(&self, msg: &str) {
        Self::error(self, msg);
    }

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        Self::record_step(self, name, status, message);
    }
}
