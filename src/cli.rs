//! Command-line interface: subcommands and their options.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the dconf category snapshot tool.
#[derive(Parser, Debug)]
#[command(
    name = "dconf-snapshot",
    about = "Snapshot GNOME dconf settings by category into replayable files",
    version = env!("DCONF_SNAPSHOT_VERSION")
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Settings file (default: ~/.config/dconf-snapshot/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Category catalog file (default: categories.toml next to the settings file)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Override the snapshot output directory
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Extract and sanitize without writing files
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select categories and write their snapshot files
    Backup(BackupOpts),
    /// List the configured categories
    List,
    /// Generate a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

/// Options for the `backup` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct BackupOpts {
    /// Back up every category without showing the menu
    #[arg(long, conflicts_with = "only")]
    pub all: bool,

    /// Back up only these categories (comma-separated labels)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
