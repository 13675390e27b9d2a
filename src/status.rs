//! Working tree and branch tracking summary for the child repository.
use crate::config::ChildConfig;
use crate::exec::Executor;
use crate::git::{AheadBehind, Git};
use crate::logging::Log;

/// Files in the working tree grouped by state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatus {
    /// Paths with changes in the index.
    pub staged: Vec<String>,
    /// Paths with unstaged changes in the working tree.
    pub modified: Vec<String>,
    /// Paths git does not track.
    pub untracked: Vec<String>,
}

impl TreeStatus {
    /// Parse `git status --porcelain` (v1) output.
    ///
    /// A path can be both staged and modified.  Renames and copies report the
    /// new path.
    ///
    /// # Examples
    ///
    /// ```
    /// use submoduler_child::status::TreeStatus;
    ///
    /// let tree = TreeStatus::parse("MM lib/core.rb\n?? notes.md\n");
    /// assert_eq!(tree.staged, ["lib/core.rb"]);
    /// assert_eq!(tree.modified, ["lib/core.rb"]);
    /// assert_eq!(tree.untracked, ["notes.md"]);
    /// ```
    #[must_use]
    pub fn parse(porcelain: &str) -> Self {
        let mut tree = Self::default();
        for line in porcelain.lines() {
            let mut codes = line.chars();
            let (Some(index), Some(worktree)) = (codes.next(), codes.next()) else {
                continue;
            };
            let Some(path) = line.get(3..).filter(|p| !p.is_empty()) else {
                continue;
            };
            let path = path
                .rsplit_once(" -> ")
                .map_or(path, |(_, new)| new)
                .to_string();

            if index == '?' && worktree == '?' {
                tree.untracked.push(path);
                continue;
            }
            if "MADRC".contains(index) {
                tree.staged.push(path.clone());
            }
            if "MD".contains(worktree) {
                tree.modified.push(path);
            }
        }
        tree
    }

    /// Whether there is nothing staged, modified or untracked.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty()
    }
}

/// State of the checked-out branch relative to its upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchStatus {
    /// HEAD is not on a branch, or the branch could not be read.
    Detached,
    /// On a branch with no upstream configured.
    NoUpstream {
        /// Branch name.
        branch: String,
    },
    /// On a branch that tracks an upstream.
    Tracking {
        /// Branch name.
        branch: String,
        /// Commit counts relative to the upstream.
        counts: AheadBehind,
    },
}

/// Everything `status` reports about a child.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// The child's configured name.
    pub child_name: String,
    /// Working tree state, or the reason it could not be read.
    pub tree: Result<TreeStatus, String>,
    /// Branch state.
    pub branch: BranchStatus,
}

impl StatusReport {
    /// Gather status for the child described by `config`.
    ///
    /// Never fails: git errors are captured in the report.
    #[must_use]
    pub fn collect(config: &ChildConfig, executor: &dyn Executor) -> Self {
        let git = Git::new(executor, &config.root);
        let tree = git
            .status_porcelain()
            .map(|out| TreeStatus::parse(&out))
            .map_err(|e| format!("{e:#}"));
        let branch = match git.current_branch().ok().flatten() {
            None => BranchStatus::Detached,
            Some(branch) => match git.ahead_behind(&branch) {
                Some(counts) => BranchStatus::Tracking { branch, counts },
                None => BranchStatus::NoUpstream { branch },
            },
        };
        Self {
            child_name: config.child_name().unwrap_or_default().to_string(),
            tree,
            branch,
        }
    }

    /// Write the report through `log`.
    pub fn render(&self, log: &dyn Log) {
        log.stage(&format!("Child Submodule: {}", self.child_name));

        match &self.tree {
            Err(reason) => log.error(&format!("Failed to get git status: {reason}")),
            Ok(tree) if tree.is_clean() => log.info("Working tree is clean"),
            Ok(tree) => {
                log.info("Working tree has changes:");
                for (label, files) in [
                    ("Staged", &tree.staged),
                    ("Modified", &tree.modified),
                    ("Untracked", &tree.untracked),
                ] {
                    if files.is_empty() {
                        continue;
                    }
                    log.info(&format!("{label}:"));
                    for file in files {
                        log.info(&format!("  {file}"));
                    }
                }
            }
        }

        match &self.branch {
            BranchStatus::Detached => log.info("Not on any branch (detached HEAD)"),
            BranchStatus::NoUpstream { branch } => {
                log.info(&format!("Branch: {branch}"));
                log.info("No remote tracking branch");
            }
            BranchStatus::Tracking { branch, counts } => {
                log.info(&format!("Branch: {branch}"));
                log.info(&describe_tracking(*counts));
            }
        }
    }
}

fn describe_tracking(counts: AheadBehind) -> String {
    match (counts.ahead, counts.behind) {
        (0, 0) => "Up to date with remote".to_string(),
        (ahead, 0) => format!("Ahead of remote by {ahead} commit(s)"),
        (0, behind) => format!("Behind remote by {behind} commit(s)"),
        (ahead, behind) => {
            format!("Diverged from remote: {ahead} ahead, {behind} behind")
        }
    }
}
