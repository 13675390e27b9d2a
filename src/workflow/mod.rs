//! The `update` workflow: test, commit, bump, push, and optionally release.
//!
//! Steps run strictly in order.  The first step that returns an error aborts
//! the run; every later step is recorded as not reached.  Nothing is rolled
//! back.
pub mod steps;

use anyhow::Result;

use crate::config::ChildConfig;
use crate::exec::Executor;
use crate::git::Git;
use crate::logging::{Log, StepEntry, StepStatus};
use crate::release::ReleasePublisher;

/// What the user asked `update` to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Commit message for outstanding changes.
    pub message: String,
    /// Whether to publish a hosted release at the end.
    pub release: bool,
}

/// Everything a step needs, borrowed for the duration of one run.
pub struct Context<'a> {
    /// The child's configuration.
    pub config: &'a ChildConfig,
    /// Process runner for git and the test suite.
    pub executor: &'a dyn Executor,
    /// Progress output.
    pub log: &'a dyn Log,
    /// Release backend; `None` when no credentials are available.
    pub publisher: Option<&'a dyn ReleasePublisher>,
    /// User options.
    pub options: &'a UpdateOptions,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.config.root)
            .field("options", self.options)
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl Context<'_> {
    /// Git wrapper for the child repository.
    #[must_use]
    pub fn git(&self) -> Git<'_> {
        Git::new(self.executor, &self.config.root)
    }
}

/// Non-error outcome of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The step did its work.
    Completed,
    /// The step had nothing to do.
    Skipped(String),
}

/// One stage of the workflow.
pub trait Step {
    /// Human-readable step name.
    fn name(&self) -> &'static str;

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails; the workflow stops there.
    fn run(&self, ctx: &Context<'_>) -> Result<StepResult>;
}

/// The ordered steps for one run.
#[must_use]
pub fn steps(release: bool) -> Vec<Box<dyn Step>> {
    let mut all: Vec<Box<dyn Step>> = vec![
        Box::new(steps::RunTests),
        Box::new(steps::CommitChanges),
        Box::new(steps::BumpVersion),
        Box::new(steps::CommitVersionBump),
        Box::new(steps::Push),
    ];
    if release {
        all.push(Box::new(steps::CreateRelease));
    }
    all
}

/// Names of the steps for one run, in order.
#[must_use]
pub fn step_names(release: bool) -> Vec<&'static str> {
    steps(release).iter().map(|s| s.name()).collect()
}

/// Final state of every step in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// One entry per step, in order.
    pub steps: Vec<StepEntry>,
}

impl WorkflowOutcome {
    /// The step that failed, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&StepEntry> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    /// Whether every step completed or was skipped.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure().is_none()
    }
}

/// Run `steps` in order against `ctx`.
///
/// Each result is logged and recorded through [`Log::record_step`].
pub fn run(steps: &[Box<dyn Step>], ctx: &Context<'_>) -> WorkflowOutcome {
    let mut entries = Vec::with_capacity(steps.len());
    let mut aborted = false;

    for step in steps {
        let name = step.name();
        let (status, message) = if aborted {
            (StepStatus::NotReached, None)
        } else {
            ctx.log.stage(name);
            match step.run(ctx) {
                Ok(StepResult::Completed) => (StepStatus::Completed, None),
                Ok(StepResult::Skipped(reason)) => {
                    ctx.log.info(&format!("skipped: {reason}"));
                    (StepStatus::Skipped, Some(reason))
                }
                Err(e) => {
                    ctx.log.error(&format!("{name}: {e:#}"));
                    aborted = true;
                    (StepStatus::Failed, Some(format!("{e:#}")))
                }
            }
        };
        ctx.log.record_step(name, status, message.as_deref());
        entries.push(StepEntry {
            name: name.to_string(),
            status,
            message,
        });
    }

    WorkflowOutcome { steps: entries }
}
