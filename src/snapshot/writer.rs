//! Serializes blocks to the snapshot file format and writes them atomically.
use std::io::Write as _;
use std::path::Path;

use super::parser::ConfigBlock;
use crate::error::SnapshotError;

/// Serialize blocks as `[header]` plus lines, one blank line between blocks,
/// with a trailing newline.
#[must_use]
pub fn serialize(blocks: &[ConfigBlock]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(&block.header);
        out.push_str("]\n");
        for line in &block.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Mode given to newly created snapshot files, before the umask.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Write `blocks` to `path`, replacing any existing file.
///
/// Content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never observe a partial file. Missing
/// parent directories are created. A replaced file keeps its permissions;
/// a new one gets [`NEW_FILE_MODE`] on Unix.
///
/// # Errors
///
/// Returns [`SnapshotError::Write`] if any filesystem step fails.
pub fn write_snapshot(path: &Path, blocks: &[ConfigBlock]) -> Result<(), SnapshotError> {
    let write_err = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        builder.permissions(std::fs::Permissions::from_mode(NEW_FILE_MODE));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(serialize(blocks).as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
