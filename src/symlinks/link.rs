//! Path arithmetic and platform symlink primitives.
use anyhow::{Context as _, Result};
use std::path::{Component, Path, PathBuf};

/// Lexically normalise `path`: drop `.` components and fold `..` into the
/// preceding component without touching the filesystem.
///
/// A `..` that would climb above the root is dropped; a leading `..` on a
/// relative path is kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Path of `to` relative to the directory `from_dir`, computed lexically.
///
/// Both paths are normalised first.  When they share no common root (e.g.,
/// different drives on Windows) `to` is returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use submoduler_child::symlinks::link::relative_path;
///
/// let rel = relative_path(
///     Path::new("/work/parent/vendor/child/.kiro/steering"),
///     Path::new("/work/parent/.kiro/steering/style.md"),
/// );
/// assert_eq!(rel, Path::new("../../../../.kiro/steering/style.md"));
/// ```
#[must_use]
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize(from_dir);
    let to_norm = normalize(to);
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to_norm.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let rooted = |c: &Component<'_>| matches!(c, Component::RootDir | Component::Prefix(_));
    if common == 0 && (from_parts.first().is_some_and(rooted) || to_parts.first().is_some_and(rooted))
    {
        return to_norm;
    }

    let mut rel = PathBuf::new();
    for _ in from_parts.iter().skip(common) {
        rel.push("..");
    }
    for part in to_parts.iter().skip(common) {
        rel.push(part);
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Resolve `path` through at most one level of symlink.
///
/// Relative link text is resolved against the directory containing `path`.
/// Non-symlinks are returned as they are.
#[must_use]
pub fn resolve_one_level(path: &Path) -> PathBuf {
    match std::fs::read_link(path) {
        Ok(dest) if dest.is_absolute() => normalize(&dest),
        Ok(dest) => {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            normalize(&base.join(dest))
        }
        Err(_) => path.to_path_buf(),
    }
}

/// Whether `path` itself (not what it points to) is a symlink.
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_symlink())
}

/// Create a file symlink at `link` whose stored text is `dest`.
///
/// # Errors
///
/// Returns an error if the platform refuses to create the link.
pub fn create_symlink(dest: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(dest, link).with_context(|| {
            format!("creating symlink {} -> {}", link.display(), dest.display())
        })?;
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(dest, link).with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                dest.display()
            )
        })?;
    }

    Ok(())
}

/// Remove the symlink at `path` without touching what it points to.
///
/// # Errors
///
/// Returns an error if the link cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_context(|| format!("removing symlink: {}", path.display()))
}
