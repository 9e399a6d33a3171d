//! Tracing layers for snapshot runs.
//!
//! Events are shaped by target: stage headers, dry-run notices, and
//! per-category results. Category results go to the log file only; the
//! console reports them through the run summary instead.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use crossterm::style::Stylize as _;
use tracing::Level;

use super::utils::{default_log_dir, format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dconf_snapshot::stage";
/// Target used for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "dconf_snapshot::dry_run";
/// Target used for per-category outcome records.
pub(super) const RESULT_TARGET: &str = "dconf_snapshot::result";

/// Line shape of an event, decided by its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    DryRun,
    CategoryResult,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn classify(level: Level, target: &str) -> Self {
        match (level, target) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, RESULT_TARGET) => Self::CategoryResult,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    fn of(event: &tracing::Event<'_>) -> Self {
        let metadata = event.metadata();
        Self::classify(*metadata.level(), metadata.target())
    }
}

/// Fields this tool attaches to its events.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    category: Option<String>,
    status: Option<String>,
}

impl EventFields {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "category" => self.category = Some(value),
            "status" => self.status = Some(value),
            _ => {}
        }
    }
}

impl tracing::field::Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.set(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.set(field.name(), value.to_string());
    }
}

/// Render one event as a plain log-file line stamped with `ts`.
fn file_line(kind: LineKind, fields: &EventFields, ts: &str) -> String {
    let msg = strip_ansi(&fields.message);
    match kind {
        LineKind::Stage => format!("[{ts}] ==> {msg}"),
        LineKind::DryRun => format!("[{ts}]     [dry run] {msg}"),
        LineKind::CategoryResult => {
            let category = fields.category.as_deref().unwrap_or("?");
            let status = fields.status.as_deref().unwrap_or("?");
            if msg.is_empty() {
                format!("[{ts}]     [result] {category}: {status}")
            } else {
                format!("[{ts}]     [result] {category}: {status} ({msg})")
            }
        }
        LineKind::Error => format!("[{ts}]     [error] {msg}"),
        LineKind::Warn => format!("[{ts}]     [warn] {msg}"),
        LineKind::Debug => format!("[{ts}]     [debug] {msg}"),
        LineKind::Info => format!("[{ts}]     {msg}"),
    }
}

/// Render one event for the terminal, or `None` for file-only events.
fn console_line(kind: LineKind, fields: &EventFields) -> Option<String> {
    let msg = fields.message.as_str();
    let line = match kind {
        LineKind::CategoryResult => return None,
        LineKind::Error => format!("{} {msg}", "ERROR".red()),
        LineKind::Warn => format!("{}  {msg}", "WARN".yellow()),
        LineKind::Stage => format!("{} {}", "==>".blue().bold(), msg.bold()),
        LineKind::DryRun => format!("  {} {msg}", "[DRY RUN]".yellow()),
        LineKind::Info => format!("  {msg}"),
        LineKind::Debug => format!("  {}", msg.dim()),
    };
    Some(line)
}

/// A [`tracing_subscriber::Layer`] that appends all events to the run's log
/// file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `<dir>/<command>.log`, write a run header, and return a layer
    /// appending to it.
    ///
    /// Returns `None` if the directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(dir: &Path, command: &str) -> Option<Self> {
        let path = log_file_path(dir, command)?;
        let version = option_env!("DCONF_SNAPSHOT_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# dconf-snapshot {version}\n# command: {command}\n# started: {} UTC\n",
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = file_line(LineKind::of(event), &EventFields::of(event), &format_utc_time());
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits the tool's
/// console style.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        console_line(LineKind::of(event), &EventFields::of(event))
            .map_or(Ok(()), |line| writeln!(writer, "{line}"))
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Sets up a console layer in the tool's output style and a file layer that
/// writes all events (including `debug` and category results) to
/// `$XDG_CACHE_HOME/dconf-snapshot/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer =
        FileLayer::new(&default_log_dir(), command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
