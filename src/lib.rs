//! Category-driven snapshots of GNOME dconf settings.
//!
//! An interactive multi-select menu picks categories from a catalog; each
//! selected category is dumped with `dconf dump`, re-parsed into blocks,
//! reconciled against installed shell extensions when it holds shell state,
//! and written as a file that `dconf load /` can replay.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: runtime settings and the category catalog
//! - **[`menu`]**: key decoding, selection model, rendering, and the raw terminal
//! - **[`snapshot`]**: dump, parse, sanitize, and write one category at a time
//! - **[`commands`]**: top-level subcommand orchestration (`backup`, `list`, `completions`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod menu;
pub mod snapshot;
