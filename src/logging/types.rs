//! Core logging types: step entries, status, and the [`Log`] trait.

/// Workflow step result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a workflow step at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step ran to completion.
    Completed,
    /// Step decided there was nothing to do (e.g., clean tree, no token).
    Skipped,
    /// Step failed and aborted the run.
    Failed,
    /// Step never ran because an earlier step failed.
    NotReached,
}

impl StepStatus {
    /// Summary icon for this status.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Completed => "✓",
            Self::Skipped => "○",
            Self::Failed => "✗",
            Self::NotReached => "·",
        }
    }

    /// ANSI colour used for this status in the summary.
    pub(super) const fn color(self) -> &'static str {
        match self {
            Self::Completed => "\x1b[32m",
            Self::Skipped => "\x1b[33m",
            Self::Failed => "\x1b[31m",
            Self::NotReached => "\x1b[2m",
        }
    }
}

/// Per-status step counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTally {
    /// Steps that completed.
    pub completed: usize,
    /// Steps that had nothing to do.
    pub skipped: usize,
    /// Steps that failed.
    pub failed: usize,
    /// Steps after a failure.
    pub not_reached: usize,
}

impl StepTally {
    /// Count `steps` by status.
    #[must_use]
    pub fn of(steps: &[StepEntry]) -> Self {
        steps.iter().fold(Self::default(), |mut tally, step| {
            match step.status {
                StepStatus::Completed => tally.completed += 1,
                StepStatus::Skipped => tally.skipped += 1,
                StepStatus::Failed => tally.failed += 1,
                StepStatus::NotReached => tally.not_reached += 1,
            }
            tally
        })
    }

    /// Number of steps counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.completed + self.skipped + self.failed + self.not_reached
    }
}

impl std::fmt::Display for StepTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} steps: {} completed, {} skipped, {} failed, {} not reached",
            self.total(),
            self.completed,
            self.skipped,
            self.failed,
            self.not_reached
        )
    }
}

/// Abstraction over logging backends.
///
/// Components take a `&dyn Log` so they can report progress without knowing
/// whether output reaches a terminal, a log file, or a test recorder.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
}
