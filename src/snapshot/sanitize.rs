//! Reconciles declared extension lists with what is installed on the host.
use std::collections::HashSet;
use std::path::PathBuf;

use super::parser::{ConfigBlock, absolute_header};
use crate::config::settings::ShellSettings;

/// Identifiers physically present in any extension directory.
pub type InstalledExtensionSet = HashSet<String>;

/// Collect the entry names of every directory in `dirs`.
///
/// Missing or unreadable directories contribute nothing.
#[must_use]
pub fn installed_extensions(dirs: &[PathBuf]) -> InstalledExtensionSet {
    dirs.iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flatten()
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}

/// Parse a dconf string-array value.
///
/// Accepts `@as []`, `[]`, and bracketed lists of single- or double-quoted
/// strings. Returns `None` for anything else.
///
/// ```
/// use dconf_snapshot::snapshot::sanitize::parse_extension_list;
///
/// assert_eq!(
///     parse_extension_list("['a@x', \"b@y\"]"),
///     Some(vec!["a@x".to_string(), "b@y".to_string()])
/// );
/// assert_eq!(parse_extension_list("@as []"), Some(Vec::new()));
/// assert_eq!(parse_extension_list("true"), None);
/// ```
#[must_use]
pub fn parse_extension_list(value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    let value = value.strip_prefix("@as").map_or(value, str::trim_start);
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;

    let mut items = Vec::new();
    let mut chars = inner.chars();
    let mut expect_item = true;
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            ',' if !expect_item => expect_item = true,
            '\'' | '"' if expect_item => {
                let mut item = String::new();
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => item.push(chars.next()?),
                        n if n == c => {
                            closed = true;
                            break;
                        }
                        n => item.push(n),
                    }
                }
                if !closed {
                    return None;
                }
                items.push(item);
                expect_item = false;
            }
            _ => return None,
        }
    }
    if expect_item && !items.is_empty() {
        return None;
    }
    Some(items)
}

/// Serialize identifiers as a dconf string array; `@as []` when empty.
#[must_use]
pub fn format_extension_list(ids: &[String]) -> String {
    if ids.is_empty() {
        return "@as []".to_string();
    }
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("'{}'", id.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn split_key(line: &str) -> Option<(&str, &str)> {
    line.split_once('=').map(|(k, v)| (k.trim(), v))
}

/// Filters the enabled/disabled extension lists of the shell category and
/// drops its host-specific sub-trees.
#[derive(Debug)]
pub struct ExtensionSanitizer<'a> {
    settings: &'a ShellSettings,
    installed: &'a InstalledExtensionSet,
}

impl<'a> ExtensionSanitizer<'a> {
    /// Create a sanitizer for the given shell settings and installed set.
    #[must_use]
    pub const fn new(settings: &'a ShellSettings, installed: &'a InstalledExtensionSet) -> Self {
        Self {
            settings,
            installed,
        }
    }

    /// Sanitize the blocks of the shell category rooted at `root_path`.
    ///
    /// The enabled list of the root block, as found in this dump, decides
    /// which identifiers are removed from every disabled list.
    #[must_use]
    pub fn sanitize(&self, root_path: &str, blocks: Vec<ConfigBlock>) -> Vec<ConfigBlock> {
        let root = absolute_header(root_path, "/");
        let enabled_in_dump = self.enabled_in_dump(&root, &blocks);

        blocks
            .into_iter()
            .filter(|block| !self.is_excluded(&root, &block.header))
            .map(|block| ConfigBlock {
                lines: block
                    .lines
                    .into_iter()
                    .map(|line| self.filter_line(line, &enabled_in_dump))
                    .collect(),
                header: block.header,
            })
            .collect()
    }

    fn enabled_in_dump(&self, root: &str, blocks: &[ConfigBlock]) -> HashSet<String> {
        blocks
            .iter()
            .filter(|block| block.header == root)
            .flat_map(|block| &block.lines)
            .filter_map(|line| split_key(line))
            .filter(|(key, _)| *key == self.settings.enabled_key)
            .filter_map(|(_, value)| parse_extension_list(value))
            .flatten()
            .collect()
    }

    fn is_excluded(&self, root: &str, header: &str) -> bool {
        self.settings.excluded_subtrees.iter().any(|sub| {
            let excluded = absolute_header(root, sub);
            header == excluded
                || header
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn filter_line(&self, line: String, enabled_in_dump: &HashSet<String>) -> String {
        let Some((key, value)) = split_key(&line) else {
            return line;
        };
        let is_enabled_list = key == self.settings.enabled_key;
        if !is_enabled_list && key != self.settings.disabled_key {
            return line;
        }
        let Some(ids) = parse_extension_list(value) else {
            return line;
        };
        let kept: Vec<String> = ids
            .into_iter()
            .filter(|id| {
                self.installed.contains(id) && (is_enabled_list || !enabled_in_dump.contains(id))
            })
            .collect();
        format!("{key}={}", format_extension_list(&kept))
    }
}
