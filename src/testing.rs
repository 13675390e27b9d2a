//! Resolution and execution of the child's test suite.
use anyhow::{Result, bail};

use crate::config::ChildConfig;
use crate::exec::Executor;
use crate::logging::Log;

/// Runs the project's test command with the terminal attached.
#[derive(Clone, Copy)]
pub struct TestRunner<'a> {
    config: &'a ChildConfig,
    executor: &'a dyn Executor,
}

impl std::fmt::Debug for TestRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunner")
            .field("root", &self.config.root)
            .finish_non_exhaustive()
    }
}

impl<'a> TestRunner<'a> {
    /// Create a runner for the child described by `config`.
    #[must_use]
    pub fn new(config: &'a ChildConfig, executor: &'a dyn Executor) -> Self {
        Self { config, executor }
    }

    /// The command line that will be run, without extra arguments.
    ///
    /// `test.command` wins; otherwise `bundle exec rspec` when the project
    /// has a `Gemfile` and bundler is installed, else plain `rspec`.
    #[must_use]
    pub fn command(&self) -> Vec<String> {
        if let Some(cmd) = self.config.test_command()
            && !cmd.is_empty()
        {
            return cmd;
        }
        if self.config.root.join("Gemfile").is_file() && self.executor.which("bundle") {
            return vec!["bundle".into(), "exec".into(), "rspec".into()];
        }
        vec!["rspec".into()]
    }

    /// Run the suite with `extra` arguments appended, streaming its output.
    ///
    /// Returns whether the suite passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the test command cannot be started.
    pub fn run(&self, extra: &[String], log: &dyn Log) -> Result<bool> {
        let mut cmd = self.command();
        cmd.extend(extra.iter().cloned());
        let Some((program, args)) = cmd.split_first() else {
            bail!("empty test command");
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        log.info(&format!("running {}", cmd.join(" ")));
        let passed = self
            .executor
            .run_streaming_in(&self.config.root, program, &args)?;
        if passed {
            log.debug("test suite passed");
        } else {
            log.debug("test suite failed");
        }
        Ok(passed)
    }
}
