//! Steering-document symlink reconciliation.
//!
//! Mirrors `*.md` files from the parent repository's steering directories
//! into the child's `.kiro/steering` as relative symlinks.  Existing symlinks
//! are replaced, regular files are never touched, and dangling links are
//! reported but left in place.
pub mod link;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::ChildConfig;
use crate::logging::Log;

/// Steering directory, relative to a repository root.
pub const STEERING_DIR: &str = ".kiro/steering";

/// Steering source directories, relative to the parent root, in the order
/// they are applied.  Later sources replace links created by earlier ones.
pub const SOURCE_DIRS: [&str; 3] = [
    "vendor/submoduler_parent/.kiro/steering",
    "vendor/submoduler_child/.kiro/steering",
    ".kiro/steering",
];

/// Outcome for a single file name in the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// No entry existed; a symlink was created.
    Created,
    /// A symlink existed and was replaced.
    Updated,
    /// A regular file occupies the name; it was left untouched.
    Skipped,
    /// A symlink in the target points at nothing.
    Broken,
}

impl LinkClass {
    /// Marker used when listing entries of this class.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Created => "+",
            Self::Updated => "↻",
            Self::Skipped => "⊘",
            Self::Broken => "✗",
        }
    }
}

/// One classified entry in the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// File name inside the target directory.
    pub name: String,
    /// Link text written (or found, for broken links).  `None` for skipped
    /// regular files.
    pub link: Option<PathBuf>,
    /// Classification.
    pub class: LinkClass,
}

/// A link that could not be created or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// File name inside the target directory.
    pub name: String,
    /// Error description.
    pub reason: String,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct SymlinkReport {
    /// Classified entries, in processing order; broken links come last.
    pub entries: Vec<LinkEntry>,
    /// Links that could not be written.
    pub failures: Vec<LinkFailure>,
    /// Source directories that did not exist or could not be listed.
    pub missing_sources: Vec<PathBuf>,
    /// Number of `*.md` entries in the target after reconciliation.
    pub total: usize,
}

impl SymlinkReport {
    /// Number of entries in `class`.
    #[must_use]
    pub fn count(&self, class: LinkClass) -> usize {
        self.entries.iter().filter(|e| e.class == class).count()
    }

    /// Entries in `class`, in processing order.
    pub fn of_class(&self, class: LinkClass) -> impl Iterator<Item = &LinkEntry> {
        self.entries.iter().filter(move |e| e.class == class)
    }
}

/// Reconciles a target directory against an ordered list of sources.
#[derive(Debug, Clone)]
pub struct SymlinkReconciler {
    target: PathBuf,
    sources: Vec<PathBuf>,
}

impl SymlinkReconciler {
    /// Create a reconciler for explicit target and source directories.
    #[must_use]
    pub const fn new(target: PathBuf, sources: Vec<PathBuf>) -> Self {
        Self { target, sources }
    }

    /// Reconciler for a child repository: `<root>/.kiro/steering` fed from
    /// the standard steering directories under the configured parent.
    #[must_use]
    pub fn for_child(config: &ChildConfig) -> Self {
        let parent = link::normalize(&config.parent_root());
        Self::new(
            config.root.join(STEERING_DIR),
            SOURCE_DIRS.iter().map(|dir| parent.join(dir)).collect(),
        )
    }

    /// Directory the links are written into.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Source directories, in application order.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Run one reconciliation pass.
    ///
    /// Missing or unreadable source directories and individual link failures
    /// are logged as warnings and recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the target directory cannot be created or read.
    pub fn reconcile(&self, log: &dyn Log) -> Result<SymlinkReport> {
        fs::create_dir_all(&self.target)
            .with_context(|| format!("creating {}", self.target.display()))?;

        let mut report = SymlinkReport::default();
        for source in &self.sources {
            if !source.is_dir() {
                log.warn(&format!("source directory not found: {}", source.display()));
                report.missing_sources.push(source.clone());
                continue;
            }
            let entries = match markdown_entries(source) {
                Ok(entries) => entries,
                Err(e) => {
                    log.warn(&format!("source directory unreadable: {e:#}"));
                    report.missing_sources.push(source.clone());
                    continue;
                }
            };
            self.link_source(source, entries, log, &mut report);
        }

        self.scan_target(&mut report)?;
        Ok(report)
    }

    fn link_source(
        &self,
        source: &Path,
        entries: Vec<(String, PathBuf)>,
        log: &dyn Log,
        report: &mut SymlinkReport,
    ) {
        log.debug(&format!("linking from {}", source.display()));
        for (name, path) in entries {
            if path.is_dir() {
                continue;
            }
            let real = link::resolve_one_level(&path);
            let text = link::relative_path(&self.target, &real);
            let dest = self.target.join(&name);

            let class = match fs::symlink_metadata(&dest) {
                Ok(meta) if meta.is_symlink() => LinkClass::Updated,
                Ok(_) => {
                    log.debug(&format!("skipping {name}: regular file in target"));
                    report.entries.push(LinkEntry {
                        name,
                        link: None,
                        class: LinkClass::Skipped,
                    });
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => LinkClass::Created,
                Err(e) => {
                    fail(log, report, name, &anyhow::Error::new(e));
                    continue;
                }
            };

            let written = if class == LinkClass::Updated {
                link::remove_symlink(&dest).and_then(|()| link::create_symlink(&text, &dest))
            } else {
                link::create_symlink(&text, &dest)
            };
            match written {
                Ok(()) => {
                    log.debug(&format!("{} {name} -> {}", class.marker(), text.display()));
                    report.entries.push(LinkEntry {
                        name,
                        link: Some(text),
                        class,
                    });
                }
                Err(e) => fail(log, report, name, &e),
            }
        }
    }

    /// Record dangling links and the total markdown count.
    fn scan_target(&self, report: &mut SymlinkReport) -> Result<()> {
        let entries = markdown_entries(&self.target)?;
        report.total = entries.len();
        for (name, path) in entries {
            if link::is_symlink(&path) && !path.exists() {
                report.entries.push(LinkEntry {
                    name,
                    link: fs::read_link(&path).ok(),
                    class: LinkClass::Broken,
                });
            }
        }
        Ok(())
    }
}

fn fail(log: &dyn Log, report: &mut SymlinkReport, name: String, err: &anyhow::Error) {
    log.warn(&format!("failed to link {name}: {err:#}"));
    report.failures.push(LinkFailure {
        name,
        reason: format!("{err:#}"),
    });
}

/// `*.md` entries directly inside `dir`, sorted by file name.
fn markdown_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if Path::new(&name).extension().is_some_and(|ext| ext == "md") {
            entries.push((name, entry.path()));
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use std::os::unix::fs::symlink;

    struct Fixture {
        _tmp: tempfile::TempDir,
        target: PathBuf,
        sources: Vec<PathBuf>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path().to_path_buf();
            let sources = vec![root.join("parent/a"), root.join("parent/b")];
            for s in &sources {
                fs::create_dir_all(s).unwrap();
            }
            Self {
                target: root.join("child/.kiro/steering"),
                sources,
                _tmp: tmp,
            }
        }

        fn source_file(&self, idx: usize, name: &str, content: &str) {
            fs::write(self.sources[idx].join(name), content).unwrap();
        }

        fn reconciler(&self) -> SymlinkReconciler {
            SymlinkReconciler::new(self.target.clone(), self.sources.clone())
        }

        fn run(&self) -> SymlinkReport {
            self.reconciler().reconcile(&RecordingLog::default()).unwrap()
        }
    }

    #[test]
    fn creates_relative_links_for_markdown_only() {
        let fx = Fixture::new();
        fx.source_file(0, "style.md", "style");
        fx.source_file(0, "notes.txt", "ignored");
        fs::create_dir(fx.sources[0].join("dir.md")).unwrap();

        let report = fx.run();

        assert_eq!(report.count(LinkClass::Created), 1);
        let link = fs::read_link(fx.target.join("style.md")).unwrap();
        assert!(link.is_relative(), "link should be relative: {}", link.display());
        assert_eq!(link, PathBuf::from("../../../parent/a/style.md"));
        assert_eq!(fs::read_to_string(fx.target.join("style.md")).unwrap(), "style");
        assert!(!fx.target.join("notes.txt").exists());
        assert!(!fx.target.join("dir.md").exists());
        assert_eq!(report.total, 1);
    }

    #[test]
    fn regular_file_in_target_is_never_overwritten() {
        let fx = Fixture::new();
        fx.source_file(0, "local.md", "from parent");
        fx.source_file(1, "local.md", "from vendor");
        fs::create_dir_all(&fx.target).unwrap();
        fs::write(fx.target.join("local.md"), b"hand written").unwrap();

        for _ in 0..3 {
            let report = fx.run();
            assert_eq!(report.count(LinkClass::Skipped), 2);
            assert_eq!(report.count(LinkClass::Created), 0);
        }

        assert!(!link::is_symlink(&fx.target.join("local.md")));
        assert_eq!(fs::read(fx.target.join("local.md")).unwrap(), b"hand written");
    }

    #[test]
    fn second_run_updates_everything_first_run_wrote() {
        let fx = Fixture::new();
        fx.source_file(0, "a.md", "a");
        fx.source_file(0, "shared.md", "first");
        fx.source_file(1, "b.md", "b");
        fx.source_file(1, "shared.md", "second");

        let first = fx.run();
        let second = fx.run();

        assert_eq!(first.count(LinkClass::Created), 3);
        assert_eq!(first.count(LinkClass::Updated), 1);
        assert_eq!(second.count(LinkClass::Created), 0);
        assert_eq!(second.count(LinkClass::Broken), 0);
        assert_eq!(
            second.count(LinkClass::Updated),
            first.count(LinkClass::Created) + first.count(LinkClass::Updated)
        );
        assert_eq!(
            fs::read_to_string(fx.target.join("shared.md")).unwrap(),
            "second",
            "later sources win"
        );
    }

    #[test]
    fn missing_source_is_a_warning() {
        let fx = Fixture::new();
        let missing = fx.sources[0].parent().unwrap().join("absent");
        let reconciler = SymlinkReconciler::new(
            fx.target.clone(),
            vec![missing.clone(), fx.sources[1].clone()],
        );
        fx.source_file(1, "b.md", "b");
        let log = RecordingLog::default();

        let report = reconciler.reconcile(&log).unwrap();

        assert_eq!(report.missing_sources, vec![missing]);
        assert_eq!(report.count(LinkClass::Created), 1);
        assert_eq!(log.messages("warn").len(), 1);
        assert!(log.messages("warn")[0].contains("absent"));
    }

    #[test]
    fn source_symlink_is_resolved_one_level() {
        let fx = Fixture::new();
        let shared = fx.sources[0].parent().unwrap().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("guide.md"), "guide").unwrap();
        symlink("../shared/guide.md", fx.sources[0].join("guide.md")).unwrap();

        fx.run();

        let link = fs::read_link(fx.target.join("guide.md")).unwrap();
        assert_eq!(link, PathBuf::from("../../../parent/shared/guide.md"));
        assert_eq!(fs::read_to_string(fx.target.join("guide.md")).unwrap(), "guide");
    }

    #[test]
    fn dangling_links_are_reported_not_repaired() {
        let fx = Fixture::new();
        fs::create_dir_all(&fx.target).unwrap();
        symlink("../nowhere/gone.md", fx.target.join("gone.md")).unwrap();
        fx.source_file(0, "a.md", "a");

        let report = fx.run();

        let broken: Vec<_> = report.of_class(LinkClass::Broken).collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].name, "gone.md");
        assert_eq!(broken[0].link, Some(PathBuf::from("../nowhere/gone.md")));
        assert!(link::is_symlink(&fx.target.join("gone.md")));
        assert_eq!(report.total, 2);
    }

    #[test]
    fn link_to_removed_source_becomes_broken() {
        let fx = Fixture::new();
        fx.source_file(0, "old.md", "old");
        fx.run();
        fs::remove_file(fx.sources[0].join("old.md")).unwrap();

        let report = fx.run();

        assert_eq!(report.count(LinkClass::Broken), 1);
        assert_eq!(report.count(LinkClass::Updated), 0);
    }

    #[test]
    fn unwritable_target_entry_is_recorded_as_failure() {
        let fx = Fixture::new();
        fx.source_file(0, "a.md", "a");
        fx.source_file(0, "b.md", "b");
        fs::create_dir_all(&fx.target).unwrap();
        let mut perms = fs::metadata(&fx.target).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o555);
        fs::set_permissions(&fx.target, perms.clone()).unwrap();

        let log = RecordingLog::default();
        let report = fx.reconciler().reconcile(&log).unwrap();

        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        fs::set_permissions(&fx.target, perms).unwrap();

        // Root ignores directory permissions; only assert when they applied.
        if report.failures.is_empty() {
            assert_eq!(report.count(LinkClass::Created), 2);
        } else {
            assert_eq!(report.failures.len(), 2);
            assert_eq!(report.failures[0].name, "a.md");
            assert_eq!(log.messages("warn").len(), 2);
        }
    }

    #[test]
    fn unreadable_source_does_not_stop_later_sources() {
        let fx = Fixture::new();
        fx.source_file(0, "hidden.md", "hidden");
        fx.source_file(1, "g.md", "g");
        let mut perms = fs::metadata(&fx.sources[0]).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o111);
        fs::set_permissions(&fx.sources[0], perms.clone()).unwrap();
        let listable = fs::read_dir(&fx.sources[0]).is_ok();

        let log = RecordingLog::default();
        let result = fx.reconciler().reconcile(&log);

        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        fs::set_permissions(&fx.sources[0], perms).unwrap();

        let report = result.unwrap();
        assert_eq!(fs::read_to_string(fx.target.join("g.md")).unwrap(), "g");
        // Root lists the directory regardless of its mode.
        if !listable {
            assert_eq!(report.missing_sources, vec![fx.sources[0].clone()]);
            assert_eq!(report.count(LinkClass::Created), 1);
            assert!(!fx.target.join("hidden.md").exists());
            assert!(log.messages("warn")[0].contains("unreadable"));
        }
    }

    #[test]
    fn for_child_uses_configured_parent() {
        let config = ChildConfig::parse(
            Path::new("/work/parent/vendor/core"),
            "[submoduler]\nchildname = core\ntype = child\n",
        )
        .unwrap();
        let reconciler = SymlinkReconciler::for_child(&config);
        assert_eq!(
            reconciler.target(),
            Path::new("/work/parent/vendor/core/.kiro/steering")
        );
        assert_eq!(
            reconciler.sources()[0],
            Path::new("/work/parent/vendor/submoduler_parent/.kiro/steering")
        );
        assert_eq!(
            reconciler.sources()[2],
            Path::new("/work/parent/.kiro/steering")
        );
    }
}
