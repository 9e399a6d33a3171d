//! Per-category extraction pipeline: dump, parse, sanitize, write.
pub mod parser;
pub mod sanitize;
pub mod source;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::catalog::Category;
use crate::config::settings::Settings;
use crate::error::SnapshotError;
use crate::exec::Executor;
use crate::logging::{CategoryStatus, Log};
use parser::{ConfigBlock, parse_dump};
use sanitize::{ExtensionSanitizer, installed_extensions};
use source::{SnapshotSource, concatenate};

/// Successful result of processing one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// The snapshot file was written.
    Written {
        /// Snapshot file path.
        path: PathBuf,
        /// Number of blocks in the file.
        blocks: usize,
    },
    /// Dry run: the file would have been written.
    DryRun {
        /// Snapshot file path that would be written.
        path: PathBuf,
        /// Number of blocks that would be written.
        blocks: usize,
    },
}

/// Totals of a [`Pipeline::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Number of categories that failed.
    pub failed: usize,
    /// The run stopped early because the interrupt flag was raised.
    pub interrupted: bool,
}

/// Runs selected categories through the snapshot pipeline, one at a time.
#[derive(Debug)]
pub struct Pipeline<'a> {
    source: SnapshotSource<'a>,
    settings: &'a Settings,
    output_dir: PathBuf,
    dry_run: bool,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline writing into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::EmptyDumpCommand`] if the settings carry an
    /// empty dump command.
    pub fn new(
        executor: &'a dyn Executor,
        settings: &'a Settings,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            source: SnapshotSource::new(executor, &settings.dump_command)?,
            settings,
            output_dir: output_dir.to_path_buf(),
            dry_run,
            interrupt: None,
        })
    }

    /// Stop before the next category once `flag` is set.
    ///
    /// The category in progress always finishes, so no snapshot file is
    /// left half written.
    #[must_use]
    pub const fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Snapshot file path for `category`.
    #[must_use]
    pub fn snapshot_path(&self, category: &Category) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", category.file_stem(), self.settings.extension))
    }

    fn is_shell(&self, category: &Category) -> bool {
        category
            .label
            .eq_ignore_ascii_case(&self.settings.shell.category)
    }

    /// Dump and parse `category`, sanitizing it if it is the shell category.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DumpFailed`] if any path fails to dump.
    pub fn extract(&self, category: &Category, log: &dyn Log) -> Result<Vec<ConfigBlock>, SnapshotError> {
        let dumps = self.source.dump_category(category)?;
        for dump in &dumps {
            log.debug(&format!("dumped {} ({} bytes)", dump.path, dump.text.len()));
        }

        let shell = self.is_shell(category);
        let blocks = parse_dump(&concatenate(&dumps), shell);
        if !shell {
            return Ok(blocks);
        }

        let installed = installed_extensions(&self.settings.resolved_extension_dirs());
        log.debug(&format!("{} installed extensions found", installed.len()));
        let root = category.paths.first().map_or("/", String::as_str);
        Ok(ExtensionSanitizer::new(&self.settings.shell, &installed).sanitize(root, blocks))
    }

    /// Extract `category` and write (or, in dry-run mode, describe) its file.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or writing fails.
    pub fn run_category(
        &self,
        category: &Category,
        log: &dyn Log,
    ) -> Result<CategoryOutcome, SnapshotError> {
        let blocks = self.extract(category, log)?;
        let path = self.snapshot_path(category);
        let count = blocks.len();

        if self.dry_run {
            return Ok(CategoryOutcome::DryRun {
                path,
                blocks: count,
            });
        }

        writer::write_snapshot(&path, &blocks)?;
        Ok(CategoryOutcome::Written {
            path,
            blocks: count,
        })
    }

    /// Process every category in order and record each result on `log`.
    ///
    /// A failing category is recorded and skipped; the rest still run.
    /// An interrupt skips the categories not yet started.
    #[must_use]
    pub fn run(&self, categories: &[&Category], log: &dyn Log) -> RunSummary {
        let mut summary = RunSummary::default();
        for category in categories {
            if self.interrupted() {
                log.warn("Interrupted; remaining categories skipped");
                summary.interrupted = true;
                break;
            }
            log.stage(&format!("Saving {}", category.label));
            match self.run_category(category, log) {
                Ok(CategoryOutcome::Written { path, blocks }) => {
                    let detail = path.display().to_string();
                    log.info(&format!("wrote {blocks} blocks to {detail}"));
                    log.record_category(&category.label, CategoryStatus::Written, Some(&detail));
                }
                Ok(CategoryOutcome::DryRun { path, blocks }) => {
                    let detail = path.display().to_string();
                    log.dry_run(&format!("would write {blocks} blocks to {detail}"));
                    log.record_category(&category.label, CategoryStatus::DryRun, Some(&detail));
                }
                Err(e) => {
                    let reason = e.to_string();
                    log.error(&format!("{}: {reason}", category.label));
                    log.record_category(&category.label, CategoryStatus::Failed, Some(&reason));
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
