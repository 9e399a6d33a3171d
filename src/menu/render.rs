//! Frame rendering for the category menu.
//!
//! Rendering is a pure function of [`SelectionState`] and the item list;
//! [`draw`] is the only function that touches a writer.
use std::io::{self, Write};

use crossterm::style::Stylize as _;
use crossterm::{cursor, queue, terminal};

use super::selection::SelectionState;
use crate::config::catalog::{AGGREGATE_LABEL, CategoryCatalog};

/// Row terminator; raw mode disables the implicit carriage return.
const EOL: &str = "\r\n";

/// One menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Row label.
    pub label: String,
    /// Shown after the label when the row is focused.
    pub description: String,
}

/// Rows for `catalog`, led by the aggregate row.
#[must_use]
pub fn menu_items(catalog: &CategoryCatalog) -> Vec<MenuItem> {
    std::iter::once(MenuItem {
        label: AGGREGATE_LABEL.to_string(),
        description: "Select every category".to_string(),
    })
    .chain(catalog.categories().iter().map(|c| MenuItem {
        label: c.label.clone(),
        description: c.description.clone(),
    }))
    .collect()
}

/// Render a complete frame, `width` columns wide.
#[must_use]
pub fn render_frame(state: &SelectionState, items: &[MenuItem], width: usize) -> String {
    let mut frame = String::new();
    frame.push_str(&format!("{}{EOL}", "Select dconf categories to snapshot".bold()));
    frame.push_str(&format!(
        "{}{EOL}{EOL}",
        "↑/↓ move   Space toggle   Enter confirm   Esc cancel".dim()
    ));

    for (row, item) in items.iter().enumerate() {
        let focused = row == state.cursor();
        let marker = if state.is_selected(row) { "[x]" } else { "[ ]" };
        let pointer = if focused { '>' } else { ' ' };
        let line = format!(" {pointer} {marker} {}", item.label);
        if focused {
            let used = line.chars().count() + 3;
            let description = truncate(&item.description, width.saturating_sub(used));
            frame.push_str(&format!("{}", line.reverse()));
            if !description.is_empty() {
                frame.push_str(&format!("{}", format!(" - {description}").dim()));
            }
        } else {
            frame.push_str(&line);
        }
        frame.push_str(EOL);
    }
    frame
}

/// Clear the screen and write `frame` from the top-left corner.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn draw(out: &mut impl Write, frame: &str) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All)
    )?;
    out.write_all(frame.as_bytes())?;
    out.flush()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::catalog::Category;
    use crate::logging::strip_ansi;
    use crate::menu::key::KeyEvent;
    use crate::menu::selection::Transition;

    fn items() -> Vec<MenuItem> {
        let catalog = CategoryCatalog::new(vec![
            Category::new("Shell", "Top bar and extensions", &["/org/gnome/shell/"]),
            Category::new("Appearance", "Themes", &["/org/gnome/desktop/interface/"]),
        ])
        .unwrap();
        menu_items(&catalog)
    }

    fn rows(frame: &str) -> Vec<String> {
        strip_ansi(frame)
            .split(EOL)
            .skip(3)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }

    #[test]
    fn aggregate_row_comes_first() {
        let items = items();
        assert_eq!(items[0].label, "All");
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn focused_row_has_pointer_and_description_only() {
        let state = SelectionState::new(2);
        let frame = render_frame(&state, &items(), 80);
        let rows = rows(&frame);
        assert_eq!(rows[0], " > [ ] All - Select every category");
        assert_eq!(rows[1], "   [ ] Shell");
        assert_eq!(rows[2], "   [ ] Appearance");
    }

    #[test]
    fn focused_row_is_inverse_video() {
        let frame = render_frame(&SelectionState::new(2), &items(), 80);
        assert!(frame.contains("\x1b[7m"), "focused row should use reverse video");
    }

    #[test]
    fn checked_rows_show_marker() {
        let Transition::Continue(state) = SelectionState::new(2).apply(KeyEvent::ToggleCurrent)
        else {
            panic!("toggle never terminates the menu");
        };
        let rows = rows(&render_frame(&state, &items(), 80));
        assert!(rows.iter().all(|r| r.contains("[x]")));
    }

    #[test]
    fn description_truncated_to_width() {
        let frame = render_frame(&SelectionState::new(2), &items(), 20);
        let rows = rows(&frame);
        assert!(rows[0].chars().count() <= 20, "row too wide: {:?}", rows[0]);
        assert!(rows[0].ends_with('…'));
    }

    #[test]
    fn rendering_does_not_mutate_state() {
        let state = SelectionState::new(2);
        let before = state.clone();
        let _ = render_frame(&state, &items(), 80);
        assert_eq!(state, before);
    }

    #[test]
    fn draw_clears_then_writes_frame() {
        let mut out = Vec::new();
        draw(&mut out, "frame").unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("\x1b[1;1H"));
        assert!(written.ends_with("frame"));
    }
}
