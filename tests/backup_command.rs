#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `backup` command.
//!
//! These tests drive the menu with scripted key input, run the selected
//! categories through the pipeline against a fake `dconf`, and inspect the
//! snapshot files and exit statuses that result.

mod common;

use std::time::Duration;

use common::*;
use dconf_snapshot::commands::backup::{self, BackupStatus};
use dconf_snapshot::config::catalog::{Category, CategoryCatalog};
use dconf_snapshot::logging::{CategoryStatus, Logger};
use dconf_snapshot::menu::MenuOutcome;
use dconf_snapshot::menu::key::ScriptedInput;
use dconf_snapshot::snapshot::parser::parse_snapshot;

const DOWN: &[u8] = b"\x1b[B";

// ---------------------------------------------------------------------------
// Selection drives which files are produced
// ---------------------------------------------------------------------------

/// Selecting only Appearance writes exactly `appearance.conf` and leaves an
/// existing `shell.conf` alone.
#[test]
fn selecting_one_category_writes_only_its_file() {
    let ws = Workspace::new(&[]);
    std::fs::create_dir_all(ws.output_dir()).unwrap();
    std::fs::write(ws.snapshot("shell.conf"), "previous\n").unwrap();
    let session = ws.session(shell_and_appearance());
    let dconf = standard_dconf();
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let input = ScriptedInput::default().bytes(DOWN).bytes(DOWN).bytes(b" \r");
    let outcome = select_with(&session.catalog, input);
    assert_eq!(outcome, MenuOutcome::Selected(vec![1]));

    let status = backup::execute(&session, outcome, &dconf, &log);
    assert_eq!(status, BackupStatus::Completed { failed: 0 });
    assert_eq!(ws.written_files(), ["appearance.conf", "shell.conf"]);
    assert_eq!(ws.read("shell.conf"), "previous\n");
    assert_eq!(
        ws.read("appearance.conf"),
        "[org/gnome/desktop/interface]\ncolor-scheme='prefer-dark'\ngtk-theme='Adwaita'\n"
    );
    assert_eq!(dconf.calls(), ["/org/gnome/desktop/interface/"]);
}

/// Toggling the aggregate row selects every category.
#[test]
fn select_all_writes_every_file() {
    let ws = Workspace::new(&["a", "b", "c"]);
    let session = ws.session(shell_and_appearance());
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let outcome = select_with(&session.catalog, ScriptedInput::from_bytes(b" \r"));
    let status = backup::execute(&session, outcome, &standard_dconf(), &log);

    assert_eq!(status.exit_code(), 0);
    assert_eq!(ws.written_files(), ["appearance.conf", "shell.conf"]);
    let labels: Vec<String> = log.category_entries().into_iter().map(|e| e.label).collect();
    assert_eq!(labels, ["Shell", "Appearance"]);
}

/// A bare Escape followed by silence cancels without touching the disk.
#[test]
fn escape_then_timeout_cancels() {
    let ws = Workspace::new(&[]);
    let session = ws.session(shell_and_appearance());
    let dconf = standard_dconf();
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let input = ScriptedInput::default()
        .bytes(b" ")
        .byte(0x1b)
        .pause(Duration::from_millis(200));
    let outcome = select_with(&session.catalog, input);
    assert_eq!(outcome, MenuOutcome::Cancelled);

    let status = backup::execute(&session, outcome, &dconf, &log);
    assert_eq!(status, BackupStatus::Cancelled);
    assert_eq!(status.exit_code(), 130);
    assert!(ws.written_files().is_empty());
    assert!(dconf.calls().is_empty());
}

/// An arrow-key sequence arriving within the timeout is not a cancel.
#[test]
fn arrow_keys_are_not_cancel() {
    let catalog = shell_and_appearance();
    let input = ScriptedInput::default()
        .byte(0x1b)
        .pause(Duration::from_millis(10))
        .bytes(b"[B")
        .bytes(b" \r");
    assert_eq!(select_with(&catalog, input), MenuOutcome::Selected(vec![0]));
}

/// Committing without any selection is a clean, non-error exit.
#[test]
fn empty_selection_is_not_an_error() {
    let ws = Workspace::new(&[]);
    let session = ws.session(shell_and_appearance());
    let dconf = standard_dconf();
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let outcome = select_with(&session.catalog, ScriptedInput::from_bytes(b"\r"));
    let status = backup::execute(&session, outcome, &dconf, &log);
    assert_eq!(status, BackupStatus::NothingSelected);
    assert_eq!(status.exit_code(), 0);
    assert!(dconf.calls().is_empty());
}

/// With three categories, one aggregate press selects all three and a single
/// deselect clears only that item and the aggregate marker.
#[test]
fn aggregate_then_single_deselect() {
    let catalog = CategoryCatalog::new(vec![
        Category::new("One", "", &["/org/one/"]),
        Category::new("Two", "", &["/org/two/"]),
        Category::new("Three", "", &["/org/three/"]),
    ])
    .unwrap();
    let input = ScriptedInput::default()
        .bytes(b" ")
        .bytes(DOWN)
        .bytes(DOWN)
        .bytes(b" \r");
    assert_eq!(select_with(&catalog, input), MenuOutcome::Selected(vec![0, 2]));
}

// ---------------------------------------------------------------------------
// Sanitized shell snapshot
// ---------------------------------------------------------------------------

/// The shell snapshot keeps only installed extensions, drops disabled
/// entries that are also enabled, and omits host-specific sub-trees.
#[test]
fn shell_snapshot_is_sanitized() {
    let ws = Workspace::new(&["a", "b", "c"]);
    let session = ws.session(shell_and_appearance());
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let status = backup::execute(
        &session,
        MenuOutcome::Selected(vec![0]),
        &standard_dconf(),
        &log,
    );
    assert_eq!(status, BackupStatus::Completed { failed: 0 });

    let shell = ws.read("shell.conf");
    insta::assert_snapshot!(shell, @r"
[org/gnome/shell]
disabled-extensions=['c']
enabled-extensions=['a', 'b']
favorite-apps=['org.gnome.Nautilus.desktop', 'org.gnome.Console.desktop']

[org/gnome/shell/app-switcher]
current-workspace-only=true
");
    assert!(shell.ends_with("current-workspace-only=true\n"));
}

/// The written file parses back to the same headers and lines.
#[test]
fn shell_snapshot_reparses() {
    let ws = Workspace::new(&["a"]);
    let session = ws.session(shell_and_appearance());
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");
    let status = backup::execute(&session, MenuOutcome::Selected(vec![0]), &standard_dconf(), &log);
    assert_eq!(status, BackupStatus::Completed { failed: 0 });

    let blocks = parse_snapshot(&ws.read("shell.conf"));
    let headers: Vec<&str> = blocks.iter().map(|b| b.header.as_str()).collect();
    assert_eq!(headers, ["org/gnome/shell", "org/gnome/shell/app-switcher"]);
    assert_eq!(blocks[0].lines[0], "disabled-extensions=@as []");
    assert_eq!(blocks[0].lines[1], "enabled-extensions=['a']");
}

/// Running twice against an unchanged store yields byte-identical files.
#[test]
fn repeated_runs_are_byte_identical() {
    let ws = Workspace::new(&["a", "b", "c"]);
    let session = ws.session(shell_and_appearance());
    let dconf = standard_dconf();

    let log = Logger::with_log_dir(&ws.log_dir(), "backup");
    let status = backup::execute(&session, MenuOutcome::Selected(vec![0, 1]), &dconf, &log);
    assert_eq!(status.exit_code(), 0);
    let first = (ws.read("shell.conf"), ws.read("appearance.conf"));

    let log = Logger::with_log_dir(&ws.log_dir(), "backup");
    let status = backup::execute(&session, MenuOutcome::Selected(vec![0, 1]), &dconf, &log);
    assert_eq!(status.exit_code(), 0);
    let second = (ws.read("shell.conf"), ws.read("appearance.conf"));

    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

/// A failing dump fails only its own category; the others are still written
/// and the run exits with status 1.
#[test]
fn failed_category_does_not_abort_others() {
    let ws = Workspace::new(&[]);
    let catalog = CategoryCatalog::new(vec![
        Category::new("Appearance", "", &["/org/gnome/desktop/interface/"]),
        Category::new("Nautilus", "", &["/org/gnome/nautilus/preferences/", "/org/gnome/broken/"]),
        Category::new("Shell", "", &["/org/gnome/shell/"]),
    ])
    .unwrap();
    let session = ws.session(catalog);
    let dconf = standard_dconf()
        .with_dump("/org/gnome/nautilus/preferences/", "[/]\ndefault-folder-viewer='list-view'\n")
        .with_failure("/org/gnome/broken/");
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let status = backup::execute(&session, MenuOutcome::Selected(vec![0, 1, 2]), &dconf, &log);
    assert_eq!(status, BackupStatus::Completed { failed: 1 });
    assert_eq!(status.exit_code(), 1);
    assert_eq!(ws.written_files(), ["appearance.conf", "shell.conf"]);

    let entries = log.category_entries();
    assert_eq!(entries[1].label, "Nautilus");
    assert_eq!(entries[1].status, CategoryStatus::Failed);
    assert!(
        entries[1]
            .message
            .as_deref()
            .is_some_and(|m| m.contains("/org/gnome/broken/"))
    );
    assert_eq!(log.failure_count(), 1);
}

/// Dry runs extract everything but write nothing.
#[test]
fn dry_run_writes_no_files() {
    let ws = Workspace::new(&[]);
    let mut session = ws.session(shell_and_appearance());
    session.dry_run = true;
    let dconf = standard_dconf();
    let log = Logger::with_log_dir(&ws.log_dir(), "backup");

    let status = backup::execute(&session, MenuOutcome::Selected(vec![0, 1]), &dconf, &log);
    assert_eq!(status, BackupStatus::Completed { failed: 0 });
    assert!(ws.written_files().is_empty());
    assert_eq!(dconf.calls().len(), 2);
    assert!(
        log.category_entries()
            .iter()
            .all(|e| e.status == CategoryStatus::DryRun)
    );
}
