//! Selection, pointer input and keyboard navigation.

use super::Grid;
use crate::layout::Viewport;
use crate::render::GridBackend;
use crate::types::{row_projection, GridEvent, Key, Location};

impl<B: GridBackend> Grid<B> {
    /// Location used when navigation starts with nothing selected: the first
    /// row, on the first column with an editor (column 1 if none has one).
    pub fn default_location(&self) -> Location {
        let col = self
            .columns
            .iter()
            .position(|column| column.has_editor())
            .unwrap_or(1);
        let cols = self.columns.len().max(1);
        Location::new(0, col.min(cols - 1))
    }

    /// Make `location` the active cell, scroll its row into view, highlight
    /// it and emit `RowSelect`. Out-of-range locations are clamped.
    pub fn select_row(&mut self, location: Location) {
        let Some(location) = location.clamped(self.view.len(), self.columns.len().max(1)) else {
            return;
        };
        self.location = Some(location);

        let (top, bottom) = Viewport::row_span(location.row, self.options.row_height);
        if let Some(scroll_top) = self.viewport.scroll_into_view(top, bottom) {
            self.scroll_to(scroll_top);
            self.render_visible();
        }

        self.backend.set_selected_row(Some(location.row));
        if let Some(row) = self.row(location.row).cloned() {
            self.events.push(GridEvent::RowSelect {
                row_index: location.row,
                row,
            });
        }
    }

    /// Click on a data cell: open its editor (if any), then select the row.
    pub fn click_cell(&mut self, row: usize, col: usize) {
        let location = Location::new(row, col);
        self.activate_editor(location);
        self.select_row(location);
    }

    /// Click on a row counter. Column 0 never has an editor.
    pub fn click_counter(&mut self, row: usize) {
        self.click_cell(row, 0);
    }

    /// Double click anywhere in a row.
    pub fn double_click(&mut self, row: usize) {
        if let Some(data) = self.row(row).cloned() {
            self.events.push(GridEvent::RowDoubleClick {
                row_index: row,
                row: data,
            });
        }
    }

    /// Check box toggled on view row `row`. Membership follows the record, not
    /// its position. The row is then selected at column 1.
    pub fn toggle_check(&mut self, row: usize, checked: bool) {
        let Some(&index) = self.view.get(row) else {
            return;
        };
        if checked {
            self.checked.insert(index);
        } else {
            self.checked.remove(&index);
        }
        self.backend.set_row_checked(row, checked);
        self.select_row(Location::new(row, 1));
    }

    /// Keyboard input while the grid has focus. Returns whether the selection
    /// moved.
    ///
    /// Up/Down move one row, clamped. Printable characters feed the
    /// type-ahead buffer; the grid jumps to the first row at or after the
    /// current one (wrapping) whose text contains the buffer, preferring the
    /// earliest match position.
    pub fn handle_key(&mut self, key: Key, now_ms: f64) -> bool {
        if self.view.is_empty() {
            return false;
        }
        let mut location = self.location.unwrap_or_else(|| self.default_location());
        let last = self.view.len() - 1;

        match key {
            Key::Up => location.row = location.row.saturating_sub(1).min(last),
            Key::Down => location.row = location.row.saturating_add(1).min(last),
            Key::Char(c) => {
                let needle = self.typeahead.push(c, now_ms).to_uppercase();
                match self.find_typeahead(&needle, location.row) {
                    Some(row) => location.row = row,
                    None => return false,
                }
            }
            Key::Other => return false,
        }

        self.select_row(location);
        true
    }

    fn find_typeahead(&self, needle: &str, from: usize) -> Option<usize> {
        let len = self.view.len();
        let mut best: Option<(usize, usize)> = None;
        for step in 0..len {
            let row = (from + step) % len;
            let Some(record) = self.row(row) else {
                continue;
            };
            let Some(offset) = row_projection(record).to_uppercase().find(needle) else {
                continue;
            };
            if best.map_or(true, |(_, best_offset)| offset < best_offset) {
                best = Some((row, offset));
            }
        }
        best.map(|(row, _)| row)
    }
}
