//! Child-side helper for Submoduler-managed Ruby gem repositories.
//!
//! A child is a gem vendored inside a parent repository and described by a
//! `.submoduler.ini` file at its root.  This crate initialises that file,
//! reports repository status, runs tests, manages the version, builds the
//! gem, links shared steering documents from the parent, and drives the
//! release-oriented `update` workflow.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load and validate `.submoduler.ini`
//! - **[`git`]**, **[`version`]**, **[`testing`]**, **[`symlinks`]**,
//!   **[`release`]**: single-purpose operations on the child
//! - **[`workflow`]**: the ordered `update` steps
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod logging;
pub mod release;
pub mod status;
pub mod symlinks;
pub mod testing;
pub mod version;
pub mod workflow;
