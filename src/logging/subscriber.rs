//! Global [`tracing`] subscriber: console output plus the per-command log file.
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

use super::file::FileLayer;
use super::format::{Kind, message};

/// Console event format: `==>` stage headers, indented messages, coloured
/// `WARN`/`ERROR` markers.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", Kind::of(event.metadata()).console(&message(event)))
    }
}

/// Install the global subscriber for one run of `command`.
///
/// The console shows `INFO` and above (`DEBUG` with `verbose`); warnings and
/// errors go to stderr, the rest to stdout.  The log file always receives
/// `DEBUG` and above.  Call once, before the first log call.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let stderr = std::io::stderr.with_max_level(tracing::Level::WARN);
    let stdout = std::io::stdout.with_min_level(tracing::Level::INFO);
    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(stderr.and(stdout))
        .with_filter(if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        });

    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
