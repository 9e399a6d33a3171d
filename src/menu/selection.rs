//! Cursor and toggle state for the category menu.
use super::key::KeyEvent;

/// Row index of the aggregate "All" pseudo-item.
pub const AGGREGATE_INDEX: usize = 0;

/// Cursor position plus per-row toggle state.
///
/// Row 0 is the aggregate; rows `1..` map to catalog entries `0..`.
/// Invariant: `selected[0]` is `true` iff every other row is `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    cursor: usize,
    selected: Vec<bool>,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The menu stays open with the updated state.
    Continue(SelectionState),
    /// The user accepted; holds the selected catalog indices in order.
    Committed(Vec<usize>),
    /// The user abandoned the menu.
    Cancelled,
}

impl SelectionState {
    /// Fresh state for `category_count` categories, nothing selected.
    #[must_use]
    pub fn new(category_count: usize) -> Self {
        let mut state = Self {
            cursor: AGGREGATE_INDEX,
            selected: vec![false; category_count + 1],
        };
        state.sync_aggregate();
        state
    }

    /// Total rows, including the aggregate.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.selected.len()
    }

    /// Focused row.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether `row` is checked. Out-of-range rows are unchecked.
    #[must_use]
    pub fn is_selected(&self, row: usize) -> bool {
        self.selected.get(row).copied().unwrap_or(false)
    }

    /// Catalog indices of the checked non-aggregate rows.
    #[must_use]
    pub fn selected_categories(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(row, &on)| on.then_some(row - 1))
            .collect()
    }

    /// Apply `event`. Every event is total over the row range.
    #[must_use]
    pub fn apply(mut self, event: KeyEvent) -> Transition {
        let count = self.item_count();
        match event {
            KeyEvent::Up => self.cursor = (self.cursor + count - 1) % count,
            KeyEvent::Down => self.cursor = (self.cursor + 1) % count,
            KeyEvent::ToggleCurrent => self.toggle_current(),
            KeyEvent::Commit => return Transition::Committed(self.selected_categories()),
            KeyEvent::Cancel => return Transition::Cancelled,
            KeyEvent::Noop => {}
        }
        Transition::Continue(self)
    }

    fn toggle_current(&mut self) {
        if self.cursor == AGGREGATE_INDEX {
            let value = !self.is_selected(AGGREGATE_INDEX);
            self.selected.fill(value);
        } else {
            if let Some(row) = self.selected.get_mut(self.cursor) {
                *row = !*row;
            }
            self.sync_aggregate();
        }
    }

    fn sync_aggregate(&mut self) {
        let all = self.selected.iter().skip(1).all(|&on| on);
        if let Some(aggregate) = self.selected.first_mut() {
            *aggregate = all;
        }
    }
}
