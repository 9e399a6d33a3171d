// Shared helpers for integration tests.
//
// Provides a scripted dump executor, catalog and settings fixtures, and a
// helper that drives the menu with synthetic key input, so each integration
// test can run the backup pipeline without a live dconf or terminal.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use dconf_snapshot::commands::Session;
use dconf_snapshot::config::catalog::{Category, CategoryCatalog};
use dconf_snapshot::config::settings::Settings;
use dconf_snapshot::exec::{ExecResult, Executor};
use dconf_snapshot::menu::key::{KeyReader, ScriptedInput};
use dconf_snapshot::menu::{MenuOutcome, run_menu};

/// Dump text served by [`FakeDconf`] for the GNOME shell root.
pub const SHELL_DUMP: &str = "[/]
disabled-extensions=['a', 'c', 'd']
enabled-extensions=['a', 'b']
favorite-apps=['org.gnome.Nautilus.desktop', 'org.gnome.Console.desktop']

[app-switcher]
current-workspace-only=true

[extensions/dash-to-dock]
dock-position='BOTTOM'

[keybindings]
toggle-overview=['<Super>s']

[weather]
automatic-location=true

[world-clocks]
locations=@av []
";

/// Dump text served by [`FakeDconf`] for the interface settings.
pub const APPEARANCE_DUMP: &str = "[/]
color-scheme='prefer-dark'
gtk-theme='Adwaita'
";

/// A fake `dconf dump` that answers per path and records every call.
///
/// Paths without a configured response fail like an invalid dconf path.
#[derive(Debug, Default)]
pub struct FakeDconf {
    responses: HashMap<String, Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeDconf {
    /// Create a fake with no configured paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `path`.
    pub fn with_dump(mut self, path: &str, text: &str) -> Self {
        self.responses
            .insert(path.to_string(), Some(text.to_string()));
        self
    }

    /// Fail the dump of `path`.
    pub fn with_failure(mut self, path: &str) -> Self {
        self.responses.insert(path.to_string(), None);
        self
    }

    /// Paths dumped so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Executor for FakeDconf {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            anyhow::bail!("{program} failed");
        }
        Ok(result)
    }

    fn run_unchecked(&self, _program: &str, args: &[&str]) -> Result<ExecResult> {
        let path = args.last().copied().unwrap_or_default().to_string();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.clone());
        }
        Ok(match self.responses.get(&path) {
            Some(Some(text)) => ExecResult {
                stdout: text.clone(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            },
            _ => ExecResult {
                stdout: String::new(),
                stderr: format!("error: no such path {path}\n"),
                success: false,
                code: Some(1),
            },
        })
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

/// The two-category catalog used by most scenarios: Shell, then Appearance.
pub fn shell_and_appearance() -> CategoryCatalog {
    CategoryCatalog::new(vec![
        Category::new("Shell", "GNOME Shell state", &["/org/gnome/shell/"]),
        Category::new("Appearance", "Theme and fonts", &["/org/gnome/desktop/interface/"]),
    ])
    .expect("valid catalog")
}

/// A fake serving both [`SHELL_DUMP`] and [`APPEARANCE_DUMP`].
pub fn standard_dconf() -> FakeDconf {
    FakeDconf::new()
        .with_dump("/org/gnome/shell/", SHELL_DUMP)
        .with_dump("/org/gnome/desktop/interface/", APPEARANCE_DUMP)
}

/// An isolated output directory plus an extension directory.
pub struct Workspace {
    /// Temporary directory holding everything below.
    pub root: tempfile::TempDir,
}

impl Workspace {
    /// Create a workspace whose extension directory holds `installed`.
    pub fn new(installed: &[&str]) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for id in installed {
            std::fs::create_dir_all(root.path().join("extensions").join(id))
                .expect("create extension dir");
        }
        Self { root }
    }

    /// Directory receiving snapshot files.
    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    /// Path of a snapshot file by name.
    pub fn snapshot(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Read a snapshot file.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.snapshot(name)).expect("read snapshot")
    }

    /// Names of all files in the output directory, sorted.
    pub fn written_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// A session over `catalog` writing into this workspace.
    pub fn session(&self, catalog: CategoryCatalog) -> Session {
        Session {
            settings: Settings {
                extension_dirs: vec![self.root.path().join("extensions")],
                ..Settings::default()
            },
            catalog,
            output_dir: self.output_dir(),
            dry_run: false,
        }
    }

    /// Path of the log directory for this workspace.
    pub fn log_dir(&self) -> PathBuf {
        self.root.path().join("logs")
    }
}

/// Drive the menu over `catalog` with scripted key input.
pub fn select_with(catalog: &CategoryCatalog, input: ScriptedInput) -> MenuOutcome {
    let mut reader = KeyReader::new(input, Duration::from_millis(50));
    let mut frames = Vec::new();
    run_menu(catalog, &mut reader, &mut frames, 80).expect("menu loop")
}
