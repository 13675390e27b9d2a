// Shared helpers for integration tests.
//
// Provides a temporary parent repository with one vendored child and a
// fluent builder so each integration test can set up an isolated tree
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use submoduler_child::config::{self, ChildConfig};

/// Relative location of the child inside the parent repository.
pub const CHILD_DIR: &str = "vendor/core";

/// An isolated parent repository backed by a [`tempfile::TempDir`].
///
/// The tree looks like `<tmp>/parent/vendor/core`, so the default parent path
/// (`../../`) from the child resolves to `<tmp>/parent`.
pub struct IntegrationTestContext {
    /// Temporary directory holding the whole tree.
    pub tmp: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create an empty parent with an empty child directory.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(tmp.path().join("parent").join(CHILD_DIR))
            .expect("create child dir");
        Self { tmp }
    }

    /// Path to the parent repository root.
    pub fn parent_path(&self) -> PathBuf {
        self.tmp.path().join("parent")
    }

    /// Path to the child repository root.
    pub fn child_path(&self) -> PathBuf {
        self.parent_path().join(CHILD_DIR)
    }

    /// Load the child's configuration.
    pub fn load_config(&self) -> ChildConfig {
        let config = ChildConfig::load(&self.child_path()).expect("load config");
        config.validate_child().expect("valid child config");
        config
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new tree.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write the standard `init` configuration for a child named `name`.
    pub fn with_child_config(self, name: &str) -> Self {
        self.with_config(&config::render_template(name))
    }

    /// Write `content` as the child's `.submoduler.ini`.
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(ChildConfig::path(&self.ctx.child_path()), content)
            .expect("write config");
        self
    }

    /// Write a file in the child, creating parent directories.
    pub fn with_child_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.child_path(), rel, content);
        self
    }

    /// Write a file in the parent, creating parent directories.
    pub fn with_parent_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.parent_path(), rel, content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, content).expect("write file");
}
