//! Invokes the settings-dump operation once per category path.
use crate::config::catalog::Category;
use crate::error::SnapshotError;
use crate::exec::Executor;

/// Prefix of the marker line recording which path produced the following text.
pub const PATH_MARKER: &str = "@@path ";

/// Raw dump text for one settings path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDump {
    /// Settings path that was dumped, as declared in the catalog.
    pub path: String,
    /// Dump output; empty when nothing is stored under the path.
    pub text: String,
}

/// Runs the configured dump command through an [`Executor`].
#[derive(Clone, Copy)]
pub struct SnapshotSource<'a> {
    executor: &'a dyn Executor,
    program: &'a str,
    leading_args: &'a [String],
}

impl std::fmt::Debug for SnapshotSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotSource")
            .field("program", &self.program)
            .field("leading_args", &self.leading_args)
            .finish_non_exhaustive()
    }
}

impl<'a> SnapshotSource<'a> {
    /// Create a source from a dump command such as `["dconf", "dump"]`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::EmptyDumpCommand`] if `command` is empty.
    pub fn new(executor: &'a dyn Executor, command: &'a [String]) -> Result<Self, SnapshotError> {
        let (program, leading_args) = command
            .split_first()
            .ok_or(SnapshotError::EmptyDumpCommand)?;
        Ok(Self {
            executor,
            program: program.as_str(),
            leading_args,
        })
    }

    /// Dump a single settings path.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DumpFailed`] if the command cannot be spawned
    /// or exits unsuccessfully. Empty output is a successful, empty dump.
    pub fn dump(&self, path: &str) -> Result<RawDump, SnapshotError> {
        let mut args: Vec<&str> = self.leading_args.iter().map(String::as_str).collect();
        args.push(path);

        let result = self
            .executor
            .run_unchecked(self.program, &args)
            .map_err(|e| SnapshotError::DumpFailed {
                path: path.to_string(),
                reason: format!("{e:#}"),
            })?;

        if !result.success {
            let stderr = result.stderr.trim();
            let reason = match (result.code, stderr.is_empty()) {
                (Some(code), true) => format!("{} exited with code {code}", self.program),
                (Some(code), false) => format!("{} exited with code {code}: {stderr}", self.program),
                (None, _) => format!("{} was terminated by a signal", self.program),
            };
            return Err(SnapshotError::DumpFailed {
                path: path.to_string(),
                reason,
            });
        }

        Ok(RawDump {
            path: path.to_string(),
            text: result.stdout,
        })
    }

    /// Dump every path of `category` in declared order, stopping at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`SnapshotError::DumpFailed`] encountered.
    pub fn dump_category(&self, category: &Category) -> Result<Vec<RawDump>, SnapshotError> {
        category.paths.iter().map(|path| self.dump(path)).collect()
    }
}

/// Join dumps into one text, each preceded by a [`PATH_MARKER`] line.
#[must_use]
pub fn concatenate(dumps: &[RawDump]) -> String {
    let mut out = String::new();
    for dump in dumps {
        out.push_str(PATH_MARKER);
        out.push_str(&dump.path);
        out.push('\n');
        out.push_str(&dump.text);
        if !dump.text.is_empty() && !dump.text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
