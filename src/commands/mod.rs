//! Subcommand implementations and the shared session setup.
pub mod backup;
pub mod completions;
pub mod list;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::catalog::CategoryCatalog;
use crate::config::settings::{Settings, expand_home};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates settings, catalog, and output-directory resolution so that
/// each command does not have to repeat the boilerplate.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded runtime settings.
    pub settings: Settings,
    /// Validated category catalog.
    pub catalog: CategoryCatalog,
    /// Directory receiving snapshot files.
    pub output_dir: PathBuf,
    /// Whether files are only described, not written.
    pub dry_run: bool,
}

impl Session {
    /// Load settings and the catalog according to the global options.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings or catalog file fails to load.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Loading configuration");
        let settings = Settings::load(global.config.as_deref()).context("loading settings")?;

        let catalog = match &global.catalog {
            Some(path) => CategoryCatalog::load_required(path),
            None => CategoryCatalog::load(catalog_path_for(global.config.as_deref()).as_deref()),
        }
        .context("loading category catalog")?;

        let output_dir = global
            .output
            .as_deref()
            .map_or_else(|| settings.resolved_output_dir(), expand_home);

        log.debug(&format!("dump command: {}", settings.dump_command.join(" ")));
        log.debug(&format!("escape timeout: {}ms", settings.escape_timeout_ms));
        log.info(&format!(
            "{} categories, output to {}",
            catalog.len(),
            output_dir.display()
        ));

        Ok(Self {
            settings,
            catalog,
            output_dir,
            dry_run: global.dry_run,
        })
    }
}

/// Default catalog location: next to an explicit settings file, otherwise
/// in the user configuration directory.
fn catalog_path_for(config: Option<&Path>) -> Option<PathBuf> {
    match config {
        Some(path) => Some(
            path.parent()
                .unwrap_or_else(|| Path::new("."))
                .join("categories.toml"),
        ),
        None => crate::config::default_catalog_path(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sits_next_to_explicit_config() {
        assert_eq!(
            catalog_path_for(Some(Path::new("/etc/snap/config.toml"))),
            Some(PathBuf::from("/etc/snap/categories.toml"))
        );
    }

    #[test]
    fn init_reads_config_and_adjacent_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "output_dir = \"snapshots\"\n").unwrap();
        std::fs::write(
            dir.path().join("categories.toml"),
            "[[category]]\nlabel = \"Mutter\"\npaths = [\"/org/gnome/mutter/\"]\n",
        )
        .unwrap();

        let (log, _tmp, _guard) = crate::logging::isolated_logger();
        let global = GlobalOpts {
            config: Some(config),
            ..GlobalOpts::default()
        };
        let session = Session::init(&global, &log).unwrap();
        assert_eq!(session.output_dir, PathBuf::from("snapshots"));
        assert_eq!(session.catalog.len(), 1);
        assert!(!session.dry_run);
    }

    #[test]
    fn output_flag_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let (log, _tmp, _guard) = crate::logging::isolated_logger();
        let global = GlobalOpts {
            config: Some(dir.path().join("absent-is-error.toml")),
            output: Some(dir.path().join("out")),
            ..GlobalOpts::default()
        };
        assert!(Session::init(&global, &log).is_err());

        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        let global = GlobalOpts {
            config: Some(dir.path().join("config.toml")),
            output: Some(dir.path().join("out")),
            dry_run: true,
            ..GlobalOpts::default()
        };
        let session = Session::init(&global, &log).unwrap();
        assert_eq!(session.output_dir, dir.path().join("out"));
        assert_eq!(session.catalog, CategoryCatalog::builtin());
        assert!(session.dry_run);
    }

    #[test]
    fn explicit_catalog_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        let (log, _tmp, _guard) = crate::logging::isolated_logger();
        let global = GlobalOpts {
            config: Some(dir.path().join("config.toml")),
            catalog: Some(dir.path().join("missing.toml")),
            ..GlobalOpts::default()
        };
        let err = Session::init(&global, &log).unwrap_err();
        assert!(format!("{err:#}").contains("loading category catalog"));
    }
}
