//! Runtime settings: output location, dump command, and sanitizer knobs.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::toml_loader;
use crate::error::ConfigError;

/// Settings controlling how the shell category is sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellSettings {
    /// Label of the category holding desktop-shell state.
    pub category: String,
    /// Key holding the enabled extension list.
    pub enabled_key: String,
    /// Key holding the disabled extension list.
    pub disabled_key: String,
    /// Sub-trees of the shell root that are always dropped.
    pub excluded_subtrees: Vec<String>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            category: "Shell".to_string(),
            enabled_key: "enabled-extensions".to_string(),
            disabled_key: "disabled-extensions".to_string(),
            excluded_subtrees: ["extensions", "keybindings", "weather", "world-clocks"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Top-level settings loaded from `config.toml`.
///
/// Every field is optional in the file; absent fields take the defaults
/// shown by [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory receiving one snapshot file per category.
    pub output_dir: PathBuf,
    /// File extension for snapshot files (without the dot).
    pub extension: String,
    /// Program and leading arguments of the dump operation; the path is appended.
    pub dump_command: Vec<String>,
    /// Bounded wait after ESC before it counts as a bare cancel.
    pub escape_timeout_ms: u64,
    /// Directories whose entries are the installed extension identifiers.
    pub extension_dirs: Vec<PathBuf>,
    /// Shell category sanitizer settings.
    pub shell: ShellSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dots/gnome/dconf"),
            extension: "conf".to_string(),
            dump_command: vec!["dconf".to_string(), "dump".to_string()],
            escape_timeout_ms: 50,
            extension_dirs: vec![
                PathBuf::from("~/.local/share/gnome-shell/extensions"),
                PathBuf::from("/usr/share/gnome-shell/extensions"),
            ],
            shell: ShellSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from the default config location.
    ///
    /// An explicit path must exist; the default location may be absent, in
    /// which case built-in defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return toml_loader::load_required(path);
        }
        let Some(path) = super::config_dir().map(|d| d.join("config.toml")) else {
            return Ok(Self::default());
        };
        Ok(toml_loader::load_optional(&path)?.unwrap_or_default())
    }

    /// The ESC disambiguation timeout.
    #[must_use]
    pub const fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }

    /// Extension directories with a leading `~` expanded to `$HOME`.
    #[must_use]
    pub fn resolved_extension_dirs(&self) -> Vec<PathBuf> {
        self.extension_dirs.iter().map(|p| expand_home(p)).collect()
    }

    /// Output directory with a leading `~` expanded to `$HOME`.
    #[must_use]
    pub fn resolved_output_dir(&self) -> PathBuf {
        expand_home(&self.output_dir)
    }
}

/// Expand a leading `~` component to the `HOME` directory.
///
/// Paths without a leading `~`, or when `HOME` is unset, are returned as-is.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
