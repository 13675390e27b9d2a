//! Command: link steering documents from the parent repository.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::ChildConfig;
use crate::logging::{Log, Logger};
use crate::symlinks::{LinkClass, SymlinkReconciler, SymlinkReport};

/// Reconcile `.kiro/steering` against the parent's steering directories.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the target
/// directory cannot be created or listed.  Individual link failures are
/// reported as warnings.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    execute(&setup.config, log)?;
    Ok(())
}

/// Reconcile links for the child described by `config` and print the report.
///
/// # Errors
///
/// Returns an error if the target directory cannot be created or listed.
pub fn execute(config: &ChildConfig, log: &dyn Log) -> Result<SymlinkReport> {
    let reconciler = SymlinkReconciler::for_child(config);
    log.stage("Building steering symlinks");
    log.info(&format!("target: {}", reconciler.target().display()));
    log.info(&format!("parent: {}", config.parent_root().display()));

    let report = reconciler.reconcile(log)?;
    render(&report, log);
    Ok(report)
}

/// Print per-class link lists, failures, and the total.
pub fn render(report: &SymlinkReport, log: &dyn Log) {
    for (class, heading) in [
        (LinkClass::Created, "Created"),
        (LinkClass::Updated, "Updated"),
        (LinkClass::Skipped, "Skipped (regular file)"),
        (LinkClass::Broken, "Broken"),
    ] {
        let entries: Vec<_> = report.of_class(class).collect();
        if entries.is_empty() {
            continue;
        }
        log.info(&format!("{heading} ({}):", entries.len()));
        for entry in entries {
            match &entry.link {
                Some(link) => log.info(&format!(
                    "  {} {} -> {}",
                    class.marker(),
                    entry.name,
                    link.display()
                )),
                None => log.info(&format!("  {} {}", class.marker(), entry.name)),
            }
        }
    }

    for failure in &report.failures {
        log.warn(&format!("could not link {}: {}", failure.name, failure.reason));
    }
    log.info(&format!("Total steering documents: {}", report.total));
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use crate::symlinks::SOURCE_DIRS;
    use std::fs;

    #[test]
    fn links_parent_documents_and_prints_report() {
        let tmp = tempfile::tempdir().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("vendor/core");
        fs::create_dir_all(&child).unwrap();
        let source = parent.join(SOURCE_DIRS[0]);
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("guide.md"), "guide").unwrap();

        let config = ChildConfig::parse(
            &child,
            "[submoduler]\nchildname = core\ntype = child\n",
        )
        .unwrap();
        let log = RecordingLog::default();
        let report = execute(&config, &log).unwrap();

        assert_eq!(report.count(LinkClass::Created), 1);
        assert_eq!(report.total, 1);
        let info = log.messages("info");
        assert!(info.contains(&"Created (1):".to_string()), "{info:?}");
        assert!(info.iter().any(|m| m.starts_with("  + guide.md -> ")));
        assert!(info.contains(&"Total steering documents: 1".to_string()));
        assert_eq!(
            fs::read_to_string(child.join(".kiro/steering/guide.md")).unwrap(),
            "guide"
        );
        // Two of the three source directories do not exist.
        assert_eq!(log.messages("warn").len(), 2);
    }
}
