//! Structured logger with dry-run awareness and summary collection.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, RESULT_TARGET, STAGE_TARGET};
use super::types::{CategoryEntry, CategoryStatus, Log};
use super::utils::{default_log_dir, log_file_path};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are also written to a persistent log file at
/// `$XDG_CACHE_HOME/dconf-snapshot/<command>.log` by the subscriber's file
/// layer, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    categories: Mutex<Vec<CategoryEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command` using the default log directory.
    ///
    /// The log file itself is created by
    /// [`init_subscriber`](super::subscriber::init_subscriber); this
    /// constructor only remembers its path for the run summary.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_dir(&default_log_dir(), command)
    }

    /// Create a logger whose summary points at `<dir>/<command>.log`.
    #[must_use]
    pub fn with_log_dir(dir: &Path, command: &str) -> Self {
        Self {
            categories: Mutex::new(Vec::new()),
            log_file: log_file_path(dir, command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded category entries.
    #[must_use]
    pub fn category_entries(&self) -> Vec<CategoryEntry> {
        self.categories.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a category result for the summary and the log file.
    pub fn record_category(&self, label: &str, status: CategoryStatus, message: Option<&str>) {
        tracing::info!(
            target: RESULT_TARGET,
            category = label,
            status = status.as_str(),
            "{}",
            message.unwrap_or_default()
        );
        if let Ok(mut guard) = self.categories.lock() {
            guard.push(CategoryEntry {
                label: label.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed categories.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.categories.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|c| c.status == CategoryStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded categories.
    pub fn print_summary(&self) {
        let entries = self.category_entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut written = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.status {
                CategoryStatus::Written => {
                    written += 1;
                    ("✓", "\x1b[32m")
                }
                CategoryStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                CategoryStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.label));
        }

        let total = written + dry_run + failed;
        self.info(&format!(
            "{total} categories: \x1b[32m{written} written\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_category(&self, label: &str, status: CategoryStatus, message: Option<&str>) {
        self.record_category(label, status, message);
    }
}
