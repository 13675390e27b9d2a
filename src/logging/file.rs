//! Per-command log file under the user cache directory.
use std::fs::{self, File};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use super::format::{Kind, message};

/// `$XDG_CACHE_HOME/submoduler`, else `~/.cache/submoduler`, created on demand.
fn log_dir() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CACHE_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?)
            .join(".cache"),
    };
    let dir = base.join("submoduler");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for `command`, e.g. `~/.cache/submoduler/update.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(format!("{command}.log")))
}

fn header(command: &str) -> String {
    let version = option_env!("SUBMODULER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    let rule = "=".repeat(42);
    format!(
        "{rule}\nSubmoduler {command} {version} {}\n{rule}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Layer writing every event it sees to the command's log file, with
/// timestamps and without colour codes.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Truncate the log for `command` and write the run header.
    ///
    /// `None` when the cache directory or file is not writable; logging then
    /// goes to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let mut file = File::create(log_file_path(command)?).ok()?;
        file.write_all(header(command).as_bytes()).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let time = Utc::now().format("%H:%M:%S").to_string();
        let line = Kind::of(event.metadata()).file(&time, &message(event));
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn header_names_command_and_version() {
        let text = header("update");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Submoduler update "));
        assert!(lines[1].ends_with(" UTC"));
        assert_eq!(lines[0], lines[2]);
    }
}
