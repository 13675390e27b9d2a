//! Command: create `.submoduler.ini` and the standard directory layout.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use regex::Regex;

use crate::cli::{GlobalOpts, InitOpts};
use crate::config::{self, ChildConfig};
use crate::error::ConfigError;
use crate::logging::{Log, Logger};

/// Directories created alongside the configuration file.
pub const STANDARD_DIRS: [&str; 3] = ["lib", "spec", "bin"];

/// Initialise the repository root as a child submodule.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the configuration file
/// already exists, or any file or directory cannot be created.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;
    initialize(&root, opts.name.as_deref(), log)
}

/// Write the configuration template and create [`STANDARD_DIRS`] in `root`.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyInitialized`] without touching the tree if
/// the configuration file is already present.
pub fn initialize(root: &Path, name: Option<&str>, log: &dyn Log) -> Result<()> {
    let path = ChildConfig::path(root);
    if path.exists() {
        return Err(ConfigError::AlreadyInitialized { path }.into());
    }

    let name = match name.filter(|n| !n.trim().is_empty()) {
        Some(n) => n.trim().to_string(),
        None => detect_name(root)?,
    };
    log.stage(&format!("Initializing child submodule: {name}"));

    fs::write(&path, config::render_template(&name))
        .with_context(|| format!("writing {}", path.display()))?;
    log.info(&format!("created {}", config::CONFIG_FILE));

    for dir in STANDARD_DIRS {
        let full = root.join(dir);
        if full.is_dir() {
            log.debug(&format!("{dir}/ already exists"));
            continue;
        }
        fs::create_dir_all(&full).with_context(|| format!("creating {}", full.display()))?;
        log.info(&format!("created {dir}/"));
    }

    log.info("Next steps:");
    log.info(&format!(
        "  1. Set the parent path in {} if it is not ../../",
        config::CONFIG_FILE
    ));
    log.info("  2. Run `submoduler_child symlink_build` to link steering documents");
    log.info("  3. Run `submoduler_child status` to check the repository");
    Ok(())
}

/// Child name from the first `*.gemspec` (sorted), else the directory name.
///
/// # Errors
///
/// Returns an error if the root cannot be listed or a gemspec cannot be read.
pub fn detect_name(root: &Path) -> Result<String> {
    if let Some(gemspec) = first_gemspec(root)? {
        let content = fs::read_to_string(&gemspec)
            .with_context(|| format!("reading {}", gemspec.display()))?;
        let pattern = Regex::new(r#"\.name\s*=\s*["']([^"']+)["']"#)
            .context("compiling gemspec name pattern")?;
        if let Some(name) = pattern.captures(&content).and_then(|c| c.get(1)) {
            return Ok(name.as_str().to_string());
        }
        if let Some(stem) = gemspec.file_stem().and_then(|s| s.to_str()) {
            return Ok(stem.to_string());
        }
    }
    Ok(root
        .file_name()
        .map_or_else(|| "child".to_string(), |n| n.to_string_lossy().into_owned()))
}

/// The alphabetically first `*.gemspec` directly under `root`.
///
/// # Errors
///
/// Returns an error if `root` cannot be listed.
pub fn first_gemspec(root: &Path) -> Result<Option<PathBuf>> {
    let mut specs: Vec<_> = fs::read_dir(root)
        .with_context(|| format!("listing {}", root.display()))?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "gemspec"))
        .collect();
    specs.sort();
    Ok(specs.into_iter().next())
}
