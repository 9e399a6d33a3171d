//! Core logging types: category entries, status, and the [`Log`] trait.

/// Per-category extraction result for summary reporting.
#[derive(Debug, Clone)]
pub struct CategoryEntry {
    /// Category label as shown in the menu.
    pub label: String,
    /// Final status of the category.
    pub status: CategoryStatus,
    /// Optional detail message (e.g., written path or error description).
    pub message: Option<String>,
}

/// Status of a processed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus {
    /// Snapshot file was written.
    Written,
    /// Ran in dry-run mode; nothing was written.
    DryRun,
    /// Extraction or writing failed; other categories were unaffected.
    Failed,
}

impl CategoryStatus {
    /// Lowercase name used in log-file result lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// pipeline code logs through this trait so tests can swap in a recorder.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a category result for the summary.
    fn record_category(&self, label: &str, status: CategoryStatus, message: Option<&str>);
}
