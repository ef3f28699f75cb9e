//! Column width and visibility changes, and the header row.

use super::Grid;
use crate::render::builder::header;
use crate::render::GridBackend;
use crate::types::MIN_COLUMN_WIDTH;

impl<B: GridBackend> Grid<B> {
    /// Re-render the header from the visible columns.
    pub fn render_header(&mut self) {
        let node = header(&self.options, &self.columns, &self.sort, &self.filters);
        self.backend.render_header(&node);
    }

    /// Finish a resize drag on the column at `col`.
    ///
    /// `dragged` is the header cell width the user dragged to; it is floored at
    /// the minimum width and the column keeps one extra pixel for the border.
    /// Materialized cells are resized in place and the settings store is told.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize_column(&mut self, col: usize, dragged: f64) {
        let dragged = if dragged.is_finite() {
            dragged.round().clamp(f64::from(MIN_COLUMN_WIDTH), f64::from(u32::MAX - 1))
        } else {
            f64::from(MIN_COLUMN_WIDTH)
        };
        let Some(column) = self.columns.get_mut(col) else {
            return;
        };
        column.width = dragged as u32 + 1;
        let width = f64::from(column.width) - 1.0;
        self.settings.save_column(column);
        tracing::debug!(col, width, "column resized");
        self.backend.set_column_width(col, width);
        self.render_header();
    }

    /// Show or hide the column at `col`. Persists the change and rebuilds the
    /// header and the pages.
    pub fn set_column_visible(&mut self, col: usize, visible: bool) {
        let Some(column) = self.columns.get_mut(col) else {
            return;
        };
        if column.visible == visible {
            return;
        }
        column.visible = visible;
        self.settings.save_column(column);
        tracing::debug!(col, visible, "column visibility");
        self.render_header();
        self.rebuild_pages();
        self.render_visible();
    }
}
