//! Logging infrastructure for structured console and file output.

mod file;
mod format;
mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, StepEntry, StepStatus, StepTally};

/// Tracing target that marks stage headers.
pub(crate) const STAGE_TARGET: &str = "submoduler::stage";

/// Serializes `XDG_CACHE_HOME` manipulation across parallel test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a [`FileLayer`](file::FileLayer), so that tracing events
/// emitted by logger methods reach the log file during tests.
///
/// The returned guard must be kept alive for the duration of the test;
/// dropping it restores the previous thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let env_lock = TEST_ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    // SAFETY: Protected by TEST_ENV_MUTEX; restored before lock is released.
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("XDG_CACHE_HOME", tmp.path());
    }
    let file_layer = file::FileLayer::new("test").expect("failed to create file layer");
    let log = Logger::new("test");
    #[allow(unsafe_code)]
    unsafe {
        std::env::remove_var("XDG_CACHE_HOME");
    }
    drop(env_lock);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}

/// A [`Log`] implementation that keeps every message in memory, for
/// asserting on warnings and step records in unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    messages: std::sync::Mutex<Vec<(&'static str, String)>>,
    steps: std::sync::Mutex<Vec<StepEntry>>,
}

#[cfg(test)]
impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push((level, msg.to_string()));
        }
    }

    /// Messages logged at `level` (`"stage"`, `"info"`, `"debug"`, `"warn"`, `"error"`).
    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.messages.lock().map_or_else(
            |_| vec![],
            |m| {
                m.iter()
                    .filter(|(l, _)| *l == level)
                    .map(|(_, msg)| msg.clone())
                    .collect()
            },
        )
    }

    /// Step records, in order.
    pub(crate) fn steps(&self) -> Vec<StepEntry> {
        self.steps.lock().map_or_else(|_| vec![], |s| s.clone())
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut s) = self.steps.lock() {
            s.push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
