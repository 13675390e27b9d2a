//! Typed wrapper over the handful of git commands the child workflow uses.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::exec::{ExecResult, Executor};

/// Commits ahead of and behind the upstream branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AheadBehind {
    /// Local commits not yet on the upstream branch.
    pub ahead: u32,
    /// Upstream commits not yet merged locally.
    pub behind: u32,
}

/// Git commands run in one repository through an [`Executor`].
///
/// Arguments are always passed as an argument vector, never through a shell.
#[derive(Clone, Copy)]
pub struct Git<'a> {
    executor: &'a dyn Executor,
    dir: &'a Path,
}

impl std::fmt::Debug for Git<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("dir", &self.dir).finish_non_exhaustive()
    }
}

impl<'a> Git<'a> {
    /// Create a wrapper for the repository at `dir`.
    #[must_use]
    pub fn new(executor: &'a dyn Executor, dir: &'a Path) -> Self {
        Self { executor, dir }
    }

    fn run(&self, args: &[&str]) -> Result<ExecResult> {
        self.executor.run_in(self.dir, "git", args)
    }

    /// Raw `git status --porcelain` output.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails (e.g., not a repository).
    pub fn status_porcelain(&self) -> Result<String> {
        Ok(self.run(&["status", "--porcelain"])?.stdout)
    }

    /// Whether the working tree has no staged, modified or untracked files.
    ///
    /// # Errors
    ///
    /// Returns an error if `git status` fails.
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.status_porcelain()?.trim().is_empty())
    }

    /// Stage every change in the working tree (`git add .`).
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    pub fn add_all(&self) -> Result<()> {
        self.run(&["add", "."]).context("staging changes")?;
        Ok(())
    }

    /// Commit the index with `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message])
            .context("committing changes")?;
        Ok(())
    }

    /// Name of the checked-out branch, or `None` on a detached HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let name = self.run(&["branch", "--show-current"])?.stdout;
        let name = name.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    /// Ahead/behind counts of `branch` against its upstream.
    ///
    /// Returns `None` when the branch has no upstream or the output cannot
    /// be parsed.
    #[must_use]
    pub fn ahead_behind(&self, branch: &str) -> Option<AheadBehind> {
        let range = format!("{branch}...@{{u}}");
        let result = self
            .executor
            .run_unchecked_in(self.dir, "git", &["rev-list", "--left-right", "--count", &range])
            .ok()?;
        if !result.success {
            return None;
        }
        parse_ahead_behind(&result.stdout)
    }

    /// `git push`.  The result is returned unchecked so callers can decide
    /// how to treat a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be spawned.
    pub fn push(&self) -> Result<ExecResult> {
        self.executor.run_unchecked_in(self.dir, "git", &["push"])
    }

    /// `git push --tags`, unchecked like [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be spawned.
    pub fn push_tags(&self) -> Result<ExecResult> {
        self.executor
            .run_unchecked_in(self.dir, "git", &["push", "--tags"])
    }

    /// URL of the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote does not exist.
    pub fn remote_url(&self) -> Result<String> {
        let out = self
            .run(&["remote", "get-url", "origin"])
            .context("reading origin remote URL")?;
        Ok(out.stdout.trim().to_string())
    }

    /// Most recent tag reachable from HEAD, if any.
    #[must_use]
    pub fn latest_tag(&self) -> Option<String> {
        let result = self
            .executor
            .run_unchecked_in(self.dir, "git", &["describe", "--tags", "--abbrev=0"])
            .ok()?;
        let tag = result.stdout.trim();
        (result.success && !tag.is_empty()).then(|| tag.to_string())
    }
}

/// Parse `git rev-list --left-right --count` output (`"<ahead>\t<behind>"`).
fn parse_ahead_behind(output: &str) -> Option<AheadBehind> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    Some(AheadBehind { ahead, behind })
}
