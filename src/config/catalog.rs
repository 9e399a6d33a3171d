//! The category catalog: human labels mapped to dconf path prefixes.
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;

/// Label of the reserved select-all pseudo-category.
pub const AGGREGATE_LABEL: &str = "All";

/// A named group of settings paths backed up as one unit.
///
/// # Examples
///
/// ```
/// use dconf_snapshot::config::catalog::Category;
///
/// let category = Category::new("Privacy & Search", "", &["/org/gnome/desktop/privacy/"]);
/// assert_eq!(category.file_stem(), "privacy_and_search");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    /// Label shown in the menu; unique within a catalog.
    pub label: String,
    /// One-line description shown for the focused row.
    #[serde(default)]
    pub description: String,
    /// Settings paths dumped for this category, in declared order.
    pub paths: Vec<String>,
}

impl Category {
    /// Build a category from borrowed parts.
    #[must_use]
    pub fn new(label: &str, description: &str, paths: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            paths: paths.iter().map(ToString::to_string).collect(),
        }
    }

    /// Normalized file stem of the trimmed label: lower-cased, spaces to
    /// `_`, `&` to `and`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.label
            .trim()
            .to_lowercase()
            .replace(' ', "_")
            .replace('&', "and")
    }
}

/// On-disk catalog layout: an ordered `[[category]]` array.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    category: Vec<Category>,
}

/// An immutable, validated, ordered list of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Validate and wrap `categories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a label is empty, duplicated,
    /// or equal to [`AGGREGATE_LABEL`], two labels share a file stem, or a
    /// category has no paths.
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        let mut stems: HashMap<String, &str> = HashMap::new();
        for category in &categories {
            let label = category.label.trim();
            if label.is_empty() {
                return Err(ConfigError::EmptyLabel);
            }
            if label.eq_ignore_ascii_case(AGGREGATE_LABEL) {
                return Err(ConfigError::ReservedLabel);
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(ConfigError::DuplicateLabel(category.label.clone()));
            }
            let stem = category.file_stem();
            if let Some(first) = stems.get(&stem) {
                return Err(ConfigError::DuplicateFileName {
                    first: (*first).to_string(),
                    second: category.label.clone(),
                    stem,
                });
            }
            stems.insert(stem, &category.label);
            if category.paths.is_empty() {
                return Err(ConfigError::NoPaths(category.label.clone()));
            }
        }
        Ok(Self { categories })
    }

    /// Load a catalog file, or the built-in catalog when `path` is `None`
    /// or does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        match toml_loader::load_optional::<CatalogFile>(path)? {
            Some(file) => Self::new(file.category),
            None => Ok(Self::builtin()),
        }
    }

    /// Load a catalog file that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed, or
    /// fails validation.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml_loader::load_required(path)?;
        Self::new(file.category)
    }

    /// Parse a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml_loader::parse_str(content, "<catalog>")?;
        Self::new(file.category)
    }

    /// The GNOME categories restored by `dconf load /` on the install side.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = vec![
            Category::new(
                "Appearance",
                "Themes, fonts, icons, wallpaper and colour scheme",
                &[
                    "/org/gnome/desktop/interface/",
                    "/org/gnome/desktop/background/",
                    "/org/gnome/desktop/screensaver/",
                    "/org/gnome/desktop/sound/",
                ],
            ),
            Category::new(
                "Shell",
                "Top bar, dash favourites and enabled extensions",
                &["/org/gnome/shell/"],
            ),
            Category::new(
                "Extensions",
                "Per-extension preferences",
                &["/org/gnome/shell/extensions/"],
            ),
            Category::new(
                "Keybindings",
                "Window manager, media and custom shortcuts",
                &[
                    "/org/gnome/desktop/wm/keybindings/",
                    "/org/gnome/settings-daemon/plugins/media-keys/",
                    "/org/gnome/shell/keybindings/",
                    "/org/gnome/mutter/keybindings/",
                ],
            ),
            Category::new(
                "Window Manager",
                "Titlebar buttons, focus mode, workspaces and tiling",
                &["/org/gnome/desktop/wm/preferences/", "/org/gnome/mutter/"],
            ),
            Category::new(
                "Nautilus",
                "File manager views and preferences",
                &["/org/gnome/nautilus/"],
            ),
            Category::new(
                "Privacy & Search",
                "Recent files, usage history and search providers",
                &[
                    "/org/gnome/desktop/privacy/",
                    "/org/gnome/desktop/search-providers/",
                ],
            ),
            Category::new(
                "System",
                "Power, night light and session settings",
                &[
                    "/org/gnome/settings-daemon/plugins/power/",
                    "/org/gnome/settings-daemon/plugins/color/",
                    "/org/gnome/desktop/session/",
                ],
            ),
        ];
        Self { categories }
    }

    /// All categories in declared order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories (excluding the aggregate row).
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always `false` for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Index of the category labelled `label`, ignoring case.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.categories
            .iter()
            .position(|c| c.label.eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let builtin = CategoryCatalog::builtin();
        let validated = CategoryCatalog::new(builtin.categories().to_vec()).unwrap();
        assert_eq!(validated, builtin);
    }

    #[test]
    fn builtin_file_stems_match_restore_side() {
        let stems: Vec<String> = CategoryCatalog::builtin()
            .categories()
            .iter()
            .map(Category::file_stem)
            .collect();
        assert_eq!(
            stems,
            [
                "appearance",
                "shell",
                "extensions",
                "keybindings",
                "window_manager",
                "nautilus",
                "privacy_and_search",
                "system"
            ]
        );
    }

    #[test]
    fn duplicate_labels_rejected_case_insensitively() {
        let err = CategoryCatalog::new(vec![
            Category::new("Shell", "", &["/a/"]),
            Category::new("shell", "", &["/b/"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLabel(ref l) if l == "shell"));
    }

    #[test]
    fn labels_sharing_a_file_stem_rejected() {
        let err = CategoryCatalog::new(vec![
            Category::new("Window Manager", "", &["/a/"]),
            Category::new("window_manager", "", &["/b/"]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateFileName { ref first, ref second, ref stem }
                if first == "Window Manager" && second == "window_manager" && stem == "window_manager"
        ));
    }

    #[test]
    fn ampersand_and_word_and_collide() {
        let err = CategoryCatalog::new(vec![
            Category::new("Privacy & Search", "", &["/a/"]),
            Category::new("Privacy and Search", "", &["/b/"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFileName { .. }));
    }

    #[test]
    fn file_stem_ignores_surrounding_whitespace() {
        assert_eq!(Category::new(" Shell ", "", &["/a/"]).file_stem(), "shell");
        assert_eq!(Category::new("\tWindow Manager", "", &["/a/"]).file_stem(), "window_manager");
    }

    #[test]
    fn aggregate_label_is_reserved() {
        let err = CategoryCatalog::new(vec![Category::new("All", "", &["/a/"])]).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedLabel));
    }

    #[test]
    fn category_without_paths_rejected() {
        let err = CategoryCatalog::new(vec![Category::new("Empty", "", &[])]).unwrap_err();
        assert!(matches!(err, ConfigError::NoPaths(_)));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(
            CategoryCatalog::new(Vec::new()),
            Err(ConfigError::EmptyCatalog)
        ));
    }

    #[test]
    fn from_toml_preserves_declared_order() {
        let catalog = CategoryCatalog::from_toml(
            r#"
[[category]]
label = "Shell"
description = "Shell state"
paths = ["/org/gnome/shell/"]

[[category]]
label = "Appearance"
paths = ["/org/gnome/desktop/interface/", "/org/gnome/desktop/background/"]
"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.categories()[0].label, "Shell");
        assert_eq!(catalog.categories()[1].paths.len(), 2);
        assert_eq!(catalog.categories()[1].description, "");
    }

    #[test]
    fn load_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CategoryCatalog::load(Some(&dir.path().join("categories.toml"))).unwrap();
        assert_eq!(catalog, CategoryCatalog::builtin());
    }

    #[test]
    fn load_required_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CategoryCatalog::load_required(&dir.path().join("categories.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn position_ignores_case() {
        let catalog = CategoryCatalog::builtin();
        assert_eq!(catalog.position("window manager"), Some(4));
        assert_eq!(catalog.position("nope"), None);
    }
}
