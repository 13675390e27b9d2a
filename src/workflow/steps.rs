//! The individual steps of the update workflow.
use anyhow::{Result, bail};

use super::{Context, Step, StepResult};
use crate::release::{ReleaseRequest, TOKEN_ENV, parse_github_repo};
use crate::testing::TestRunner;
use crate::version::{BumpKind, VersionFile};

/// Run the test suite; a failing suite aborts the update.
#[derive(Debug)]
pub struct RunTests;

impl Step for RunTests {
    fn name(&self) -> &'static str {
        "Run tests"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        if !TestRunner::new(ctx.config, ctx.executor).run(&[], ctx.log)? {
            bail!("tests failed, aborting update");
        }
        Ok(StepResult::Completed)
    }
}

/// Commit outstanding work with the user's message.
#[derive(Debug)]
pub struct CommitChanges;

impl Step for CommitChanges {
    fn name(&self) -> &'static str {
        "Commit changes"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        let git = ctx.git();
        if git.is_clean()? {
            return Ok(StepResult::Skipped("no changes to commit".to_string()));
        }
        git.add_all()?;
        git.commit(&ctx.options.message)?;
        ctx.log.info(&format!("committed: {}", ctx.options.message));
        Ok(StepResult::Completed)
    }
}

/// Increment the patch version in the version file.
#[derive(Debug)]
pub struct BumpVersion;

impl Step for BumpVersion {
    fn name(&self) -> &'static str {
        "Bump version"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        let file = VersionFile::locate(ctx.config)?;
        let (old, new) = file.bump(BumpKind::Patch)?;
        ctx.log.info(&format!("{old} → {new}"));
        ctx.log.debug(&format!("wrote {}", file.path.display()));
        Ok(StepResult::Completed)
    }
}

/// Commit the version file change.
#[derive(Debug)]
pub struct CommitVersionBump;

impl Step for CommitVersionBump {
    fn name(&self) -> &'static str {
        "Commit version bump"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        let git = ctx.git();
        if git.is_clean()? {
            return Ok(StepResult::Skipped("no changes to commit".to_string()));
        }
        let version = VersionFile::locate(ctx.config)?.read()?;
        let message = format!("Bump version to {version}");
        git.add_all()?;
        git.commit(&message)?;
        ctx.log.info(&format!("committed: {message}"));
        Ok(StepResult::Completed)
    }
}

/// Push commits and tags.  Push failures are reported but not fatal.
#[derive(Debug)]
pub struct Push;

impl Step for Push {
    fn name(&self) -> &'static str {
        "Push"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        let git = ctx.git();
        for (label, result) in [("git push", git.push()?), ("git push --tags", git.push_tags()?)]
        {
            if result.success {
                ctx.log.debug(&format!("{label} succeeded"));
            } else {
                ctx.log.warn(&format!(
                    "{label} exited with status {}: {}",
                    result.code.unwrap_or(-1),
                    result.stderr.trim()
                ));
            }
        }
        Ok(StepResult::Completed)
    }
}

/// Publish a hosted release for the latest tag.
///
/// An unrecognised remote fails the step; a rejected API call is logged as
/// an error and leaves the run successful.
#[derive(Debug)]
pub struct CreateRelease;

impl Step for CreateRelease {
    fn name(&self) -> &'static str {
        "Create release"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<StepResult> {
        let Some(publisher) = ctx.publisher else {
            ctx.log
                .warn(&format!("{TOKEN_ENV} not set, skipping release creation"));
            return Ok(StepResult::Skipped(format!("{TOKEN_ENV} not set")));
        };

        let git = ctx.git();
        let repo = parse_github_repo(&git.remote_url()?)?;
        let Some(tag) = git.latest_tag() else {
            ctx.log.warn("no tags found, skipping release creation");
            return Ok(StepResult::Skipped("no tags found".to_string()));
        };

        let request = ReleaseRequest::for_tag(&tag);
        ctx.log.debug(&format!("creating {} in {repo}", request.name));
        match publisher.create_release(&repo, &request) {
            Ok(url) => {
                ctx.log.info(&format!("created {}: {url}", request.name));
                Ok(StepResult::Completed)
            }
            Err(e) => {
                ctx.log.error(&e.to_string());
                Ok(StepResult::Skipped(e.to_string()))
            }
        }
    }
}
