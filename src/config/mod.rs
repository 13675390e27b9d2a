//! Access to the child's `.submoduler.ini` configuration.
pub mod ini;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use ini::KvSection;

/// File name of the configuration file at the repository root.
pub const CONFIG_FILE: &str = ".submoduler.ini";

/// Value of `submoduler.type` that marks a child record.
pub const CHILD_TYPE: &str = "child";

/// Parent location used when the configuration does not name one.
pub const DEFAULT_PARENT_PATH: &str = "../../";

/// Parsed `.submoduler.ini` for one child repository.
///
/// Loaded once per command and passed by reference into every component.
#[derive(Debug, Clone)]
pub struct ChildConfig {
    /// Repository root the configuration was loaded from.
    pub root: PathBuf,
    sections: Vec<KvSection>,
}

impl ChildConfig {
    /// Path of the configuration file for the repository at `root`.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Whether `root` contains a configuration file.
    #[must_use]
    pub fn exists(root: &Path) -> bool {
        Self::path(root).is_file()
    }

    /// Load the configuration from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is absent,
    /// [`ConfigError::Io`] if it cannot be read, and
    /// [`ConfigError::InvalidSyntax`] if it cannot be parsed.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(root);
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(root, &content).map_err(|e| match e {
            ConfigError::InvalidSyntax { message, .. } => ConfigError::InvalidSyntax {
                file: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration text for the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSyntax`] if the content is not valid INI.
    pub fn parse(root: &Path, content: &str) -> Result<Self, ConfigError> {
        let sections =
            ini::parse_kv_sections_from_str(content).map_err(|e| ConfigError::InvalidSyntax {
                file: CONFIG_FILE.to_string(),
                message: format!("{e:#}"),
            })?;
        Ok(Self {
            root: root.to_path_buf(),
            sections,
        })
    }

    /// Look up `section.key`, ignoring case in both names.
    ///
    /// When a section appears more than once, later occurrences win.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .rev()
            .filter(|s| s.name.eq_ignore_ascii_case(section))
            .find_map(|s| s.get(key))
    }

    /// Like [`get`](Self::get), treating empty values as absent.
    fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|v| !v.is_empty())
    }

    fn has_section(&self, section: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(section))
    }

    /// The child's name (`submoduler.childname`).
    #[must_use]
    pub fn child_name(&self) -> Option<&str> {
        self.get_non_empty("submoduler", "childname")
    }

    /// The record type marker (`submoduler.type`).
    #[must_use]
    pub fn record_type(&self) -> Option<&str> {
        self.get_non_empty("submoduler", "type")
    }

    /// Configured location of the parent repository, if any.
    ///
    /// `submoduler.path` takes precedence over `parent.path`.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.get_non_empty("submoduler", "path")
            .or_else(|| self.get_non_empty("parent", "path"))
    }

    /// Parent repository root, resolved against the child root.
    ///
    /// Falls back to [`DEFAULT_PARENT_PATH`] when unset.
    #[must_use]
    pub fn parent_root(&self) -> PathBuf {
        self.root
            .join(self.parent_path().unwrap_or(DEFAULT_PARENT_PATH))
    }

    /// Library directory (`paths.lib`, default `lib`).
    #[must_use]
    pub fn lib_dir(&self) -> PathBuf {
        self.root
            .join(self.get_non_empty("paths", "lib").unwrap_or("lib"))
    }

    /// Explicit version file (`paths.version`), relative to the root.
    #[must_use]
    pub fn version_file(&self) -> Option<PathBuf> {
        self.get_non_empty("paths", "version")
            .map(|p| self.root.join(p))
    }

    /// Explicit test command (`test.command`), split on whitespace.
    #[must_use]
    pub fn test_command(&self) -> Option<Vec<String>> {
        self.get_non_empty("test", "command")
            .map(|c| c.split_whitespace().map(String::from).collect())
    }

    /// Check that this is a child record with the keys every command needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] if `[submoduler]` is absent,
    /// [`ConfigError::InvalidType`] if `type` is not `child`, and
    /// [`ConfigError::MissingKey`] if `childname` is absent.
    pub fn validate_child(&self) -> Result<(), ConfigError> {
        if !self.has_section("submoduler") {
            return Err(ConfigError::MissingSection("submoduler".to_string()));
        }
        match self.record_type() {
            Some(t) if t.eq_ignore_ascii_case(CHILD_TYPE) => {}
            other => {
                return Err(ConfigError::InvalidType {
                    found: other.unwrap_or_default().to_string(),
                });
            }
        }
        if self.child_name().is_none() {
            return Err(ConfigError::MissingKey {
                section: "submoduler".to_string(),
                key: "childname".to_string(),
            });
        }
        Ok(())
    }
}

/// Render the initial configuration written by `init`.
#[must_use]
pub fn render_template(child_name: &str) -> String {
    format!(
        "[submoduler]\n\
         childname = {child_name}\n\
         type = {CHILD_TYPE}\n\
         \n\
         [paths]\n\
         lib = lib\n\
         spec = spec\n\
         \n\
         [parent]\n\
         # Path to parent submodule (relative or absolute)\n\
         # path = ../parent\n"
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ChildConfig {
        ChildConfig::parse(Path::new("/work/child"), content).unwrap()
    }

    #[test]
    fn template_round_trips_as_valid_child() {
        let config = parse(&render_template("core"));
        config.validate_child().unwrap();
        assert_eq!(config.child_name(), Some("core"));
        assert_eq!(config.get("paths", "spec"), Some("spec"));
        assert_eq!(config.parent_path(), None);
    }

    #[test]
    fn validate_rejects_parent_type() {
        let config = parse("[submoduler]\nchildname = core\ntype = parent\n");
        let err = config.validate_child().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { ref found } if found == "parent"));
    }

    #[test]
    fn validate_rejects_missing_type() {
        let config = parse("[submoduler]\nchildname = core\n");
        assert!(matches!(
            config.validate_child(),
            Err(ConfigError::InvalidType { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_section() {
        let config = parse("[paths]\nlib = lib\n");
        assert!(matches!(
            config.validate_child(),
            Err(ConfigError::MissingSection(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_childname() {
        let config = parse("[submoduler]\ntype = child\n");
        assert!(matches!(
            config.validate_child(),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn submoduler_path_takes_precedence_over_parent_path() {
        let config = parse("[submoduler]\npath = ../up\n[parent]\npath = ../other\n");
        assert_eq!(config.parent_path(), Some("../up"));
        let config = parse("[submoduler]\ntype = child\n[parent]\npath = ../other\n");
        assert_eq!(config.parent_path(), Some("../other"));
    }

    #[test]
    fn parent_root_defaults_two_levels_up() {
        let config = parse(&render_template("core"));
        assert_eq!(
            config.parent_root(),
            Path::new("/work/child").join(DEFAULT_PARENT_PATH)
        );
    }

    #[test]
    fn test_command_is_split_on_whitespace() {
        let config = parse("[test]\ncommand = bundle exec rake spec\n");
        assert_eq!(
            config.test_command(),
            Some(vec![
                "bundle".to_string(),
                "exec".to_string(),
                "rake".to_string(),
                "spec".to_string()
            ])
        );
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ChildConfig::exists(dir.path()));
        assert!(matches!(
            ChildConfig::load(dir.path()),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn load_reports_file_on_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ChildConfig::path(dir.path()), "childname = core\n").unwrap();
        let err = ChildConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
        assert!(err.to_string().contains(CONFIG_FILE), "got: {err}");
    }

    #[test]
    fn load_reads_file_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ChildConfig::path(dir.path()), render_template("demo")).unwrap();
        let config = ChildConfig::load(dir.path()).unwrap();
        assert_eq!(config.child_name(), Some("demo"));
        assert_eq!(config.root, dir.path());
    }
}
