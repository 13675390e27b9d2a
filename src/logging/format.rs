//! Rendering of log events for the console and the log file.
use super::STAGE_TARGET;

/// How an event is presented, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Stage,
    Info,
    Debug,
    Warn,
    Error,
}

impl Kind {
    pub(super) fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match *metadata.level() {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => Self::Stage,
            tracing::Level::INFO => Self::Info,
            tracing::Level::DEBUG | tracing::Level::TRACE => Self::Debug,
        }
    }

    /// Coloured terminal line.
    pub(super) fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        }
    }

    /// Plain log-file line stamped with `time`.
    pub(super) fn file(self, time: &str, msg: &str) -> String {
        let msg = strip_ansi(msg);
        match self {
            Self::Stage => format!("[{time}] ==> {msg}"),
            Self::Info => format!("[{time}]     {msg}"),
            Self::Debug => format!("[{time}]     [debug] {msg}"),
            Self::Warn => format!("[{time}]     [warn] {msg}"),
            Self::Error => format!("[{time}]     [error] {msg}"),
        }
    }
}

/// Text of an event's `message` field.
pub(super) fn message(event: &tracing::Event<'_>) -> String {
    #[derive(Default)]
    struct Visitor(String);

    impl tracing::field::Visit for Visitor {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut visitor = Visitor::default();
    event.record(&mut visitor);
    visitor.0
}

/// Remove terminal escape sequences.
///
/// A CSI sequence (`ESC [`) runs up to its final byte in `@`..=`~`; any
/// other escape swallows the single character after it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
        } else if chars.next() == Some('[') {
            let _ = chars.by_ref().find(|b| ('@'..='~').contains(b));
        }
    }
    out
}
