//! Command: select categories and write their snapshot files.
use anyhow::{Context as _, Result};
use std::process::ExitCode;

use super::Session;
use crate::cli::{BackupOpts, GlobalOpts};
use crate::config::catalog::{Category, CategoryCatalog};
use crate::error::ConfigError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{CategoryStatus, Log, Logger};
use crate::menu::{self, MenuOutcome, terminal};
use crate::snapshot::Pipeline;

/// How a backup run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    /// Every selected category was processed; `failed` of them failed.
    Completed {
        /// Number of categories that failed.
        failed: usize,
    },
    /// The user committed an empty selection.
    NothingSelected,
    /// The user cancelled the menu.
    Cancelled,
    /// A termination signal stopped the run between categories.
    Interrupted {
        /// Number of categories that failed before the interrupt.
        failed: usize,
    },
}

impl BackupStatus {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Completed { failed: 0 } | Self::NothingSelected => 0,
            Self::Completed { .. } => 1,
            Self::Cancelled | Self::Interrupted { .. } => terminal::INTERRUPTED_EXIT_CODE,
        }
    }
}

/// Run the backup command.
///
/// # Errors
///
/// Returns an error if configuration loading, label resolution, or the
/// interactive menu fails. Per-category failures are reported in the
/// summary and the exit code instead.
pub fn run(global: &GlobalOpts, opts: &BackupOpts, log: &Logger) -> Result<ExitCode> {
    let session = Session::init(global, log)?;

    if let Err(e) = terminal::install_signal_handler() {
        log.debug(&format!("signal handler not installed: {e}"));
    }

    let outcome = match preselected(&session.catalog, opts)? {
        Some(indices) => MenuOutcome::Selected(indices),
        None => menu::select_interactively(&session.catalog, session.settings.escape_timeout())
            .context("running category menu")?,
    };

    let status = execute(&session, outcome, &SystemExecutor, log);
    log.print_summary();
    Ok(ExitCode::from(status.exit_code()))
}

/// Indices chosen by `--all` or `--only`, or `None` for the interactive menu.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCategory`] for an `--only` label that
/// matches no category.
pub fn preselected(
    catalog: &CategoryCatalog,
    opts: &BackupOpts,
) -> Result<Option<Vec<usize>>, ConfigError> {
    if opts.all {
        return Ok(Some((0..catalog.len()).collect()));
    }
    if opts.only.is_empty() {
        return Ok(None);
    }
    let mut indices = Vec::new();
    for label in &opts.only {
        let index = catalog
            .position(label)
            .ok_or_else(|| ConfigError::UnknownCategory(label.clone()))?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    Ok(Some(indices))
}

/// Run the pipeline for a menu outcome and report the result.
#[must_use]
pub fn execute(
    session: &Session,
    outcome: MenuOutcome,
    executor: &dyn Executor,
    log: &dyn Log,
) -> BackupStatus {
    let indices = match outcome {
        MenuOutcome::Cancelled => {
            log.warn("Backup cancelled; no files were written");
            return BackupStatus::Cancelled;
        }
        MenuOutcome::Selected(indices) if indices.is_empty() => {
            log.info("No categories selected; nothing to do");
            return BackupStatus::NothingSelected;
        }
        MenuOutcome::Selected(indices) => indices,
    };

    let categories: Vec<&Category> = indices
        .iter()
        .filter_map(|&i| session.catalog.get(i))
        .collect();
    log.info(&format!(
        "selected: {}",
        categories
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    if let Some(program) = session.settings.dump_command.first()
        && !executor.which(program)
    {
        log.warn(&format!("{program} not found on PATH"));
    }

    let pipeline = match Pipeline::new(
        executor,
        &session.settings,
        &session.output_dir,
        session.dry_run,
    ) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            for category in &categories {
                log.record_category(
                    &category.label,
                    CategoryStatus::Failed,
                    Some(&e.to_string()),
                );
            }
            log.error(&e.to_string());
            return BackupStatus::Completed {
                failed: categories.len(),
            };
        }
    };

    let summary = pipeline
        .with_interrupt(terminal::interrupt_flag())
        .run(&categories, log);
    if summary.interrupted {
        BackupStatus::Interrupted {
            failed: summary.failed,
        }
    } else {
        BackupStatus::Completed {
            failed: summary.failed,
        }
    }
}
