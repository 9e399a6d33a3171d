//! Restructures dump text into addressable configuration blocks.
//!
//! Dump text is INI-like: `[relative/path]` headers followed by `key=value`
//! lines, blocks separated by blank lines. A concatenated category dump
//! additionally carries [`PATH_MARKER`] lines naming the base path of the
//! text that follows.

use super::source::PATH_MARKER;

/// One `[header]` section with its ordered `key=value` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    /// Absolute settings path, without leading or trailing slashes.
    pub header: String,
    /// Ordered `key=value` lines.
    pub lines: Vec<String>,
}

impl ConfigBlock {
    /// Create a block from a header and lines.
    #[must_use]
    pub fn new(header: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            header: header.into(),
            lines,
        }
    }
}

/// Join a dump's base path with a block's relative header.
///
/// The root marker (`/`) inherits the base path. Leading and trailing
/// slashes are stripped from both parts so the result is in the form
/// `dconf load /` expects.
///
/// ```
/// use dconf_snapshot::snapshot::parser::absolute_header;
///
/// assert_eq!(absolute_header("/org/gnome/shell/", "/"), "org/gnome/shell");
/// assert_eq!(
///     absolute_header("/org/gnome/shell/", "extensions/foo"),
///     "org/gnome/shell/extensions/foo"
/// );
/// ```
#[must_use]
pub fn absolute_header(base: &str, relative: &str) -> String {
    let base = base.trim_matches('/');
    let relative = relative.trim_matches('/');
    match (base.is_empty(), relative.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base.to_string(),
        (true, false) => relative.to_string(),
        (false, false) => format!("{base}/{relative}"),
    }
}

/// Parse a concatenated category dump.
///
/// Output preserves (path, sub-block) discovery order. Blocks without any
/// `key=value` line are dropped, except root blocks when `retain_root` is
/// set. Text before the first marker, or under a marker with an empty base
/// path, has no base to attach to and is dropped.
#[must_use]
pub fn parse_dump(text: &str, retain_root: bool) -> Vec<ConfigBlock> {
    let mut blocks = Vec::new();
    for chunk in chunks(text) {
        let Some(base) = chunk.base.filter(|b| !b.trim().is_empty()) else {
            continue;
        };
        for sub in sub_blocks(&chunk.body) {
            let is_root = sub.relative.trim_matches('/').is_empty();
            if sub.lines.is_empty() && !(retain_root && is_root) {
                continue;
            }
            blocks.push(ConfigBlock::new(
                absolute_header(base.trim(), sub.relative),
                sub.lines,
            ));
        }
    }
    blocks
}

/// Parse a written snapshot file, whose headers are already absolute.
///
/// Every block is kept, including empty ones.
#[must_use]
pub fn parse_snapshot(text: &str) -> Vec<ConfigBlock> {
    let body: Vec<&str> = text.lines().collect();
    sub_blocks(&body)
        .into_iter()
        .map(|sub| ConfigBlock::new(absolute_header("", sub.relative), sub.lines))
        .collect()
}

struct Chunk<'a> {
    base: Option<&'a str>,
    body: Vec<&'a str>,
}

fn chunks(text: &str) -> Vec<Chunk<'_>> {
    let mut chunks = vec![Chunk {
        base: None,
        body: Vec::new(),
    }];
    for line in text.lines() {
        if let Some(base) = line.strip_prefix(PATH_MARKER) {
            chunks.push(Chunk {
                base: Some(base),
                body: Vec::new(),
            });
        } else if let Some(current) = chunks.last_mut() {
            current.body.push(line);
        }
    }
    chunks
}

struct SubBlock<'a> {
    relative: &'a str,
    lines: Vec<String>,
}

fn header_name(line: &str) -> Option<&str> {
    line.trim().strip_prefix('[')?.strip_suffix(']')
}

/// Split chunk body lines on blank-line-preceded headers. The start of the
/// body counts as a blank line.
///
/// A bracketed line that does not open a block (missing `]`, or no blank
/// line before it) starts a discarded run: its lines are dropped until the
/// next valid header.
fn sub_blocks<'a>(body: &[&'a str]) -> Vec<SubBlock<'a>> {
    let mut out: Vec<SubBlock<'a>> = Vec::new();
    let mut after_blank = true;
    let mut discarding = false;
    for line in body {
        if after_blank && let Some(relative) = header_name(line) {
            out.push(SubBlock {
                relative,
                lines: Vec::new(),
            });
            after_blank = false;
            discarding = false;
            continue;
        }
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            after_blank = false;
            discarding = true;
            continue;
        }
        after_blank = trimmed.is_empty();
        if !discarding
            && line.contains('=')
            && let Some(current) = out.last_mut()
        {
            current.lines.push((*line).to_string());
        }
    }
    out
}
