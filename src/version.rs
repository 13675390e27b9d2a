//! Semantic version parsing, bumping, and the on-disk version file.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context as _, Result};
use regex::Regex;

use crate::config::ChildConfig;
use crate::error::VersionError;

/// Pattern for the Ruby `VERSION = "x.y.z"` constant.
const RUBY_CONSTANT: &str = r#"VERSION\s*=\s*["']([^"']*)["']"#;

/// A `major.minor.patch` version with an optional pre-release suffix.
///
/// # Examples
///
/// ```
/// use submoduler_child::version::{BumpKind, Version};
///
/// let v: Version = "1.2.3.pre".parse().unwrap();
/// assert_eq!(v.to_string(), "1.2.3.pre");
/// assert_eq!(v.bump(BumpKind::Minor).unwrap().to_string(), "1.3.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Pre-release suffix including its leading `-` or `.`.
    pub pre: Option<String>,
}

/// Which component to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BumpKind {
    /// Increment major; reset minor and patch.
    Major,
    /// Increment minor; reset patch.
    Minor,
    /// Increment patch.
    Patch,
}

impl Version {
    /// Return the version with one component incremented and every lower
    /// component reset.  The pre-release suffix is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Overflow`] if the incremented component does
    /// not fit in a `u64`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self, VersionError> {
        let next = |n: u64| {
            n.checked_add(1)
                .ok_or_else(|| VersionError::Overflow(self.to_string()))
        };
        let (major, minor, patch) = match kind {
            BumpKind::Major => (next(self.major)?, 0, 0),
            BumpKind::Minor => (self.major, next(self.minor)?, 0),
            BumpKind::Patch => (self.major, self.minor, next(self.patch)?),
        };
        Ok(Self {
            major,
            minor,
            patch,
            pre: None,
        })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(s.to_string());
        let trimmed = s.trim();
        let mut parts = trimmed.splitn(3, '.');
        let major = parse_component(parts.next()).ok_or_else(invalid)?;
        let minor = parse_component(parts.next()).ok_or_else(invalid)?;
        let rest = parts.next().ok_or_else(invalid)?;

        let split = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (patch, suffix) = rest.split_at(split);
        let patch = parse_component(Some(patch)).ok_or_else(invalid)?;
        let pre = match suffix.chars().next() {
            None => None,
            Some('-' | '.') if suffix.len() > 1 => Some(suffix.to_string()),
            Some(_) => return Err(invalid()),
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            f.write_str(pre)?;
        }
        Ok(())
    }
}

/// Storage format of a version file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFormat {
    /// Ruby source holding a `VERSION = "..."` constant.
    Ruby,
    /// Plain text file containing only the version.
    Plain,
}

/// The file that stores the child's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// How the version is stored in it.
    pub format: VersionFormat,
}

impl VersionFile {
    /// Create a handle for `path`, choosing the format from its extension.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let format = if path.extension().is_some_and(|e| e == "rb") {
            VersionFormat::Ruby
        } else {
            VersionFormat::Plain
        };
        Self { path, format }
    }

    /// Find the version file for a child.
    ///
    /// Checks `paths.version`, then `<lib>/<childname>/version.rb`, then a
    /// `VERSION` file at the root.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::NotFound`] listing every location checked.
    pub fn locate(config: &ChildConfig) -> Result<Self, VersionError> {
        let mut candidates = Vec::new();
        if let Some(explicit) = config.version_file() {
            candidates.push(explicit);
        } else {
            if let Some(name) = config.child_name() {
                candidates.push(config.lib_dir().join(name).join("version.rb"));
            }
            candidates.push(config.root.join("VERSION"));
        }

        candidates
            .iter()
            .find(|p| p.is_file())
            .map(|p| Self::new(p.clone()))
            .ok_or_else(|| VersionError::NotFound {
                searched: candidates
                    .iter()
                    .map(|p| display_relative(&config.root, p))
                    .collect(),
            })
    }

    /// Read and parse the stored version.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, holds no version
    /// constant, or the value is not a valid version.
    pub fn read(&self) -> Result<Version> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let raw = match self.format {
            VersionFormat::Plain => content.trim().to_string(),
            VersionFormat::Ruby => {
                let (start, end) = self.constant_span(&content)?;
                content.get(start..end).unwrap_or_default().to_string()
            }
        };
        Ok(raw.parse()?)
    }

    /// Replace the stored version with `version`, keeping the rest of the
    /// file intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn write(&self, version: &Version) -> Result<()> {
        let updated = match self.format {
            VersionFormat::Plain => format!("{version}\n"),
            VersionFormat::Ruby => {
                let content = fs::read_to_string(&self.path)
                    .with_context(|| format!("reading {}", self.path.display()))?;
                let (start, end) = self.constant_span(&content)?;
                format!(
                    "{}{version}{}",
                    content.get(..start).unwrap_or_default(),
                    content.get(end..).unwrap_or_default()
                )
            }
        };
        fs::write(&self.path, updated)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Bump the stored version and return `(old, new)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or written, or if
    /// the bumped component would overflow.
    pub fn bump(&self, kind: BumpKind) -> Result<(Version, Version)> {
        let old = self.read()?;
        let new = old.bump(kind)?;
        self.write(&new)?;
        Ok((old, new))
    }

    /// Byte range of the quoted value of the first `VERSION = "..."`.
    fn constant_span(&self, content: &str) -> Result<(usize, usize)> {
        let re = Regex::new(RUBY_CONSTANT).context("compiling version pattern")?;
        let value = re
            .captures(content)
            .and_then(|c| c.get(1))
            .ok_or_else(|| VersionError::MissingConstant {
                path: self.path.clone(),
            })?;
        Ok((value.start(), value.end()))
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn bump_patch() {
        assert_eq!(v("1.2.3").bump(BumpKind::Patch).unwrap().to_string(), "1.2.4");
    }

    #[test]
    fn bump_minor_resets_patch() {
        assert_eq!(v("1.2.3").bump(BumpKind::Minor).unwrap().to_string(), "1.3.0");
    }

    #[test]
    fn bump_major_resets_lower_components() {
        assert_eq!(v("1.2.3").bump(BumpKind::Major).unwrap().to_string(), "2.0.0");
    }

    #[test]
    fn bump_drops_pre_release_suffix() {
        assert_eq!(v("0.9.0-rc.1").bump(BumpKind::Patch).unwrap().to_string(), "0.9.1");
        assert_eq!(v("0.9.0.beta").bump(BumpKind::Major).unwrap().to_string(), "1.0.0");
    }

    #[test]
    fn bump_at_component_limit_is_an_error() {
        let err = v("18446744073709551615.0.0")
            .bump(BumpKind::Major)
            .unwrap_err();
        assert!(matches!(err, VersionError::Overflow(ref s) if s == "18446744073709551615.0.0"));
        assert!(v("1.18446744073709551615.0").bump(BumpKind::Minor).is_err());
        assert_eq!(
            v("1.18446744073709551615.0")
                .bump(BumpKind::Patch)
                .unwrap()
                .to_string(),
            "1.18446744073709551615.1"
        );
    }

    #[test]
    fn parse_keeps_suffix() {
        let version = v("1.0.0-alpha");
        assert_eq!(version.pre.as_deref(), Some("-alpha"));
        assert_eq!(version.to_string(), "1.0.0-alpha");
    }

    #[test]
    fn parse_rejects_malformed_versions() {
        for bad in ["", "1", "1.2", "1.x.3", "a.b.c", "1.2.3x", "1.2.-", "-1.2.3", "1..3"] {
            assert!(bad.parse::<Version>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn ruby_version_file_round_trip_preserves_surroundings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.rb");
        fs::write(
            &path,
            "# frozen_string_literal: true\n\nmodule Core\n  VERSION = '0.4.9'\nend\n",
        )
        .unwrap();
        let file = VersionFile::new(path.clone());
        assert_eq!(file.format, VersionFormat::Ruby);

        let (old, new) = file.bump(BumpKind::Patch).unwrap();

        assert_eq!(old.to_string(), "0.4.9");
        assert_eq!(new.to_string(), "0.4.10");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# frozen_string_literal: true\n\nmodule Core\n  VERSION = '0.4.10'\nend\n"
        );
    }

    #[test]
    fn ruby_file_without_constant_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.rb");
        fs::write(&path, "module Core\nend\n").unwrap();
        let err = VersionFile::new(path).read().unwrap_err();
        assert!(err.to_string().contains("No VERSION constant"), "got: {err}");
    }

    #[test]
    fn plain_version_file_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "2.0.1\n").unwrap();
        let file = VersionFile::new(path.clone());
        file.bump(BumpKind::Minor).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "2.1.0\n");
    }

    #[test]
    fn locate_prefers_gem_convention_over_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib/core")).unwrap();
        fs::write(root.join("lib/core/version.rb"), "VERSION = \"1.0.0\"\n").unwrap();
        fs::write(root.join("VERSION"), "9.9.9\n").unwrap();
        let config =
            ChildConfig::parse(root, "[submoduler]\nchildname = core\ntype = child\n").unwrap();

        let file = VersionFile::locate(&config).unwrap();

        assert_eq!(file.path, root.join("lib/core/version.rb"));
    }

    #[test]
    fn locate_honours_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("ver.txt"), "0.1.0\n").unwrap();
        let config = ChildConfig::parse(
            root,
            "[submoduler]\nchildname = core\ntype = child\n[paths]\nversion = ver.txt\n",
        )
        .unwrap();

        let file = VersionFile::locate(&config).unwrap();

        assert_eq!(file.format, VersionFormat::Plain);
        assert_eq!(file.read().unwrap().to_string(), "0.1.0");
    }

    #[test]
    fn locate_lists_searched_paths_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChildConfig::parse(
            dir.path(),
            "[submoduler]\nchildname = core\ntype = child\n",
        )
        .unwrap();
        let err = VersionFile::locate(&config).unwrap_err();
        assert!(matches!(err, VersionError::NotFound { ref searched } if searched.len() == 2));
        assert!(err.to_string().contains("VERSION"));
    }
}
