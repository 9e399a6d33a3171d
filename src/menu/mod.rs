//! Interactive multi-select menu over the category catalog.
pub mod key;
pub mod render;
pub mod selection;
pub mod terminal;

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{cursor, queue};

use crate::config::catalog::CategoryCatalog;
use crate::error::TerminalError;
use key::{ByteSource, KeyReader};
use render::{draw, menu_items, render_frame};
use selection::{SelectionState, Transition};

/// How the menu loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Committed; holds selected catalog indices (possibly empty).
    Selected(Vec<usize>),
    /// Cancelled; nothing should be processed.
    Cancelled,
}

/// Drive the render → read → apply loop until commit or cancel.
///
/// Every iteration redraws the full frame to `out`.
///
/// # Errors
///
/// Returns an error if reading input or writing a frame fails.
pub fn run_menu<S: ByteSource, W: Write>(
    catalog: &CategoryCatalog,
    reader: &mut KeyReader<S>,
    out: &mut W,
    width: usize,
) -> io::Result<MenuOutcome> {
    let items = menu_items(catalog);
    let mut state = SelectionState::new(catalog.len());
    loop {
        draw(out, &render_frame(&state, &items, width))?;
        match state.apply(reader.next_event()?) {
            Transition::Continue(next) => state = next,
            Transition::Committed(indices) => return Ok(MenuOutcome::Selected(indices)),
            Transition::Cancelled => return Ok(MenuOutcome::Cancelled),
        }
    }
}

/// Run the menu on the controlling terminal.
///
/// Raw mode and the hidden cursor are held by a [`terminal::RawModeGuard`]
/// for the duration of the loop and released before returning.
///
/// # Errors
///
/// Returns an error if stdin is not a terminal or terminal I/O fails.
pub fn select_interactively(
    catalog: &CategoryCatalog,
    escape_timeout: Duration,
) -> Result<MenuOutcome, TerminalError> {
    let source = terminal::StdinSource::open()?;
    let mut out = io::stdout();
    let guard = terminal::RawModeGuard::acquire(&mut out)?;
    let mut reader = KeyReader::new(source, escape_timeout);
    let outcome = run_menu(catalog, &mut reader, &mut out, terminal::terminal_width());

    queue!(
        out,
        cursor::MoveTo(0, 0),
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
    )
    .ok();
    out.flush().ok();
    drop(guard);
    Ok(outcome?)
}
