//! Settings and category catalog loading.
pub mod catalog;
pub mod settings;
pub mod toml_loader;

use std::path::PathBuf;

/// Return `$XDG_CONFIG_HOME/dconf-snapshot` (default `~/.config/dconf-snapshot`).
///
/// Returns `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("dconf-snapshot"))
}

/// Default catalog location: `categories.toml` in [`config_dir`].
#[must_use]
pub fn default_catalog_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("categories.toml"))
}
