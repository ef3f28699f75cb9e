//! Editor activation and the handling of editor signals.

use std::rc::Rc;

use serde_json::Value;

use super::Grid;
use crate::editor::{Activation, CellEditor, EditorSignal, EditorState};
use crate::render::{CellRect, GridBackend};
use crate::types::{Direction, Location};

impl<B: GridBackend> Grid<B> {
    /// Attach (or with `None`, detach) the editor of the column at `col`.
    /// Unknown columns are ignored.
    pub fn set_column_editor(&mut self, col: usize, editor: Option<Rc<dyn CellEditor>>) {
        self.editors.hide_all();
        if let Some(column) = self.columns.get_mut(col) {
            column.editor = editor;
        }
    }

    /// Cell rectangle computed from the layout, relative to the grid.
    #[allow(clippy::cast_precision_loss)]
    pub fn layout_rect(&self, location: Location) -> Option<CellRect> {
        let column = self.columns.get(location.col)?;
        let before: u32 = self
            .columns
            .iter()
            .take(location.col)
            .filter(|c| c.visible)
            .map(|c| c.width)
            .sum();
        let counter = self.options.counter_width().unwrap_or(0.0);
        Some(CellRect {
            top: self.options.header_height + location.row as f64 * self.options.row_height
                - self.viewport.scroll_top,
            left: counter + f64::from(before) - self.viewport.scroll_left,
            width: f64::from(column.width) - 1.0,
            height: self.options.row_height,
        })
    }

    /// Hide open editors, then activate the editor of the column at
    /// `location` over that cell. Columns without an editor just hide.
    pub fn activate_editor(&mut self, location: Location) {
        self.editors.hide_all();
        let Some(editor) = self
            .columns
            .get(location.col)
            .and_then(|column| column.editor.clone())
        else {
            return;
        };
        if location.row >= self.view.len() {
            return;
        }

        let value = self.cell_text(location.row, location.col);
        let Some(rect) = self
            .backend
            .cell_rect(location.row, location.col)
            .or_else(|| self.layout_rect(location))
        else {
            return;
        };
        let (Some(row), Some(column)) = (
            self.view
                .get(location.row)
                .and_then(|index| self.rows.get(*index)),
            self.columns.get(location.col),
        ) else {
            return;
        };

        let activation = Activation {
            rect,
            value: value.trim(),
            row,
            column,
            row_index: location.row,
            column_index: location.col,
        };
        self.editors.activate(&editor, &activation);
    }

    /// Handle every queued editor signal.
    pub fn process_editor_signals(&mut self) {
        while let Some(signal) = self.editors.pop() {
            self.handle_editor_signal(signal);
        }
    }

    /// Apply one editor signal.
    ///
    /// `Edit` writes the value into the record and refreshes the cell's text
    /// and classes. `Move` re-activates the editor on the next cell: up/down
    /// move one row (clamped) and also select it, left/right jump to the
    /// nearest column with an editor, staying put if there is none.
    pub fn handle_editor_signal(&mut self, signal: EditorSignal) {
        match signal {
            EditorSignal::Edit { value, state } => self.apply_edit(state, value),
            EditorSignal::Move { direction, state } => {
                if self.view.is_empty() {
                    return;
                }
                let target = self.editor_target(state, direction);
                self.activate_editor(target);
                if matches!(direction, Direction::Up | Direction::Down) {
                    self.select_row(target);
                }
            }
        }
    }

    fn apply_edit(&mut self, state: EditorState, value: Value) {
        let Some(column) = self.columns.get(state.column_index) else {
            return;
        };
        let key = column.key(state.column_index);
        let Some(record) = self
            .view
            .get(state.row_index)
            .and_then(|index| self.rows.get_mut(*index))
        else {
            tracing::warn!(row = state.row_index, "edit for a row outside the view");
            return;
        };
        key.assign(record, value);

        let cell = self
            .render_context()
            .cell(state.row_index, state.column_index);
        if let Some(cell) = cell {
            self.backend.update_cell(&cell);
        }
    }

    fn editor_target(&self, state: EditorState, direction: Direction) -> Location {
        let last_row = self.view.len().saturating_sub(1);
        let row = state.row_index.min(last_row);
        let col = state.column_index;
        let has_editor = |c: &usize| self.columns.get(*c).is_some_and(|column| column.has_editor());
        match direction {
            Direction::Down => Location::new(row.saturating_add(1).min(last_row), col),
            Direction::Up => Location::new(row.saturating_sub(1), col),
            Direction::Left => Location::new(row, (0..col).rev().find(has_editor).unwrap_or(col)),
            Direction::Right => Location::new(
                row,
                (col + 1..self.columns.len()).find(has_editor).unwrap_or(col),
            ),
        }
    }
}
