//! Command: list the configured categories.
use anyhow::Result;
use std::fmt::Write as _;

use super::Session;
use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the list command, writing one log line per rendered line.
///
/// # Errors
///
/// Returns an error if configuration loading fails.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let session = Session::init(global, log)?;
    log.stage("Categories");
    for line in render(&session).lines() {
        log.info(line);
    }
    Ok(())
}

/// One entry per category: label, snapshot file name, description, paths.
#[must_use]
pub fn render(session: &Session) -> String {
    let mut out = String::new();
    for category in session.catalog.categories() {
        let file = session
            .output_dir
            .join(format!("{}.{}", category.file_stem(), session.settings.extension));
        let _ = writeln!(out, "{}  ->  {}", category.label, file.display());
        if !category.description.is_empty() {
            let _ = writeln!(out, "    {}", category.description);
        }
        for path in &category.paths {
            let _ = writeln!(out, "    {path}");
        }
    }
    out
}
