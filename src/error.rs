//! Domain-specific error types for the snapshot engine.
//!
//! Library modules return typed errors built with [`thiserror`] while the
//! command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError   : settings / catalog loading and validation
//! SnapshotError : dump invocation and snapshot file writes
//! TerminalError : raw-mode acquisition and key input
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading settings or the category catalog.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file contains a syntax or schema error.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Two catalog entries share the same label.
    #[error("Duplicate category label '{0}'")]
    DuplicateLabel(String),

    /// Two labels normalize to the same snapshot file name.
    #[error("Category labels '{first}' and '{second}' both map to file '{stem}'")]
    DuplicateFileName {
        /// Label of the earlier category.
        first: String,
        /// Label of the later category.
        second: String,
        /// Shared file stem.
        stem: String,
    },

    /// A catalog entry uses the label reserved for the select-all row.
    #[error("Category label 'All' is reserved")]
    ReservedLabel,

    /// A catalog entry has an empty label.
    #[error("Category label must not be empty")]
    EmptyLabel,

    /// A catalog entry declares no settings paths.
    #[error("Category '{0}' declares no settings paths")]
    NoPaths(String),

    /// The catalog contains no categories at all.
    #[error("Category catalog is empty")]
    EmptyCatalog,

    /// A label given on the command line matches no category.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
}

/// Errors that arise while extracting or writing one category snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The settings-dump command could not be run or exited non-zero.
    #[error("dump of {path} failed: {reason}")]
    DumpFailed {
        /// Settings path that was being dumped.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// Writing the snapshot file failed.
    #[error("writing {}: {source}", .path.display())]
    Write {
        /// Target snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configured dump command is empty.
    #[error("dump command is empty")]
    EmptyDumpCommand,
}

/// Errors that arise from terminal control and key input.
#[derive(Error, Debug)]
pub enum TerminalError {
    /// Interactive selection is not available on this platform or stdin.
    #[error("interactive selection requires a terminal: {0}")]
    Unsupported(String),

    /// A terminal I/O operation failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
