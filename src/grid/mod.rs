//! The grid controller.
//!
//! [`Grid`] owns the dataset, the columns, the filter and sort state, the page
//! mask, the selection and the editor bridge. It is generic over the DOM
//! surface ([`GridBackend`]) so the whole interaction model runs natively in
//! tests; the wasm viewer drives it with a `web-sys` backend.
//!
//! Operations never call back into the host. Notifications are queued as
//! [`GridEvent`]s and handed out by [`Grid::drain_events`].

mod columns;
mod editing;
mod filtering;
mod navigation;
mod paging;

use std::collections::HashSet;

use serde_json::Value;

use crate::dates::{DateFormatter, MomentFormatter};
use crate::editor::EditorBridge;
use crate::error::{GridError, Result};
use crate::filter::FilterSet;
use crate::layout::{InputBuffer, PageMask, ScrollScheduler, Viewport};
use crate::render::{print_table, GridBackend, RenderContext};
use crate::settings::{self, ColumnSettingsStore};
use crate::sort::SortState;
use crate::types::{Column, Counts, GridEvent, GridOptions, Location, Row};

pub use filtering::{FilterPopup, ListChoice};

/// Interactive data grid over a [`GridBackend`].
pub struct Grid<B: GridBackend> {
    backend: B,
    options: GridOptions,
    columns: Vec<Column>,
    /// Rows as loaded; never reordered or filtered
    rows: Vec<Row>,
    /// Current view: filtered, then sorted, indices into `rows`
    view: Vec<usize>,
    filters: FilterSet,
    sort: SortState,
    pages: PageMask,
    viewport: Viewport,
    scheduler: ScrollScheduler,
    typeahead: InputBuffer,
    location: Option<Location>,
    /// Checked rows as indices into `rows`, so order changes never affect them
    checked: HashSet<usize>,
    settings: Box<dyn ColumnSettingsStore>,
    dates: Box<dyn DateFormatter>,
    editors: EditorBridge,
    events: Vec<GridEvent>,
}

impl<B: GridBackend> Grid<B> {
    /// Create an empty grid. Fails if the options do not validate.
    pub fn new(backend: B, options: GridOptions) -> Result<Self> {
        options.validate()?;
        let settings = settings::from_options(&options);
        Ok(Self {
            backend,
            pages: PageMask::rebuild(0, options.page_size, options.row_height),
            scheduler: ScrollScheduler::new(f64::from(options.scroll_settle_ms)),
            typeahead: InputBuffer::new(f64::from(options.typeahead_reset_ms)),
            options,
            columns: Vec::new(),
            rows: Vec::new(),
            view: Vec::new(),
            filters: FilterSet::new(),
            sort: SortState::default(),
            viewport: Viewport::new(),
            location: None,
            checked: HashSet::new(),
            settings,
            dates: Box::new(MomentFormatter),
            editors: EditorBridge::new(),
            events: Vec::new(),
        })
    }

    /// Replace the column settings store.
    pub fn with_settings(mut self, settings: Box<dyn ColumnSettingsStore>) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the date formatting capability.
    pub fn with_date_formatter(mut self, dates: Box<dyn DateFormatter>) -> Self {
        self.dates = dates;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All loaded rows, in load order.
    pub fn original_rows(&self) -> &[Row] {
        &self.rows
    }

    /// The current view as indices into [`Grid::original_rows`].
    pub fn view(&self) -> &[usize] {
        &self.view
    }

    /// The record at view row `row`.
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.view.get(row).and_then(|index| self.rows.get(*index))
    }

    /// The current view's records, in display order.
    pub fn data(&self) -> Vec<&Row> {
        self.view
            .iter()
            .filter_map(|index| self.rows.get(*index))
            .collect()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn pages(&self) -> &PageMask {
        &self.pages
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn editors(&self) -> &EditorBridge {
        &self.editors
    }

    pub fn editors_mut(&mut self) -> &mut EditorBridge {
        &mut self.editors
    }

    /// Total and filtered row counts.
    pub fn counts(&self) -> Counts {
        Counts {
            total: self.rows.len(),
            filtered: self.view.len(),
        }
    }

    /// Checked rows in load order.
    pub fn checked_rows(&self) -> Vec<&Row> {
        let mut indices: Vec<usize> = self.checked.iter().copied().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|index| self.rows.get(index))
            .collect()
    }

    /// Whether view row `row` is checked.
    pub fn is_checked(&self, row: usize) -> bool {
        self.view
            .get(row)
            .is_some_and(|index| self.checked.contains(index))
    }

    /// Take the queued notifications.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            options: &self.options,
            columns: &self.columns,
            rows: &self.rows,
            view: &self.view,
            checked: &self.checked,
            selected: self.location.map(|l| l.row),
            dates: self.dates.as_ref(),
        }
    }

    /// Displayed text of a cell in the current view.
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        self.render_context().cell_text(row, col)
    }

    /// Load a dataset.
    ///
    /// With `columns`, every column is hydrated from the settings store and
    /// replaces the current columns. Checked rows are reset; active filters
    /// are dropped unless `keep_filters`. Filters and the active sort are then
    /// re-applied and the windowing state is rebuilt from scratch.
    pub fn set_data(&mut self, rows: Vec<Row>, columns: Option<Vec<Column>>, keep_filters: bool) {
        self.rows = rows;
        self.checked.clear();
        if !keep_filters {
            self.filters.clear();
        }
        if let Some(mut columns) = columns {
            for column in &mut columns {
                self.settings.update_column(column);
            }
            self.columns = columns;
        }
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.columns.len(),
            keep_filters,
            "set data"
        );
        self.refresh_view();
        self.render_header();
        self.rebuild_pages();
        self.render_visible();
    }

    /// Replace the record at view row `row` and patch its materialized cells.
    ///
    /// The new record is written back into the loaded rows, so it survives
    /// later filtering and sorting.
    pub fn update_row(&mut self, row: usize, data: Row) -> Result<()> {
        let len = self.view.len();
        let slot = self
            .view
            .get(row)
            .and_then(|index| self.rows.get_mut(*index))
            .ok_or(GridError::RowOutOfRange { index: row, len })?;
        *slot = data;

        if self.pages.is_rendered(self.pages.page_of_row(row)) {
            let cells: Vec<_> = {
                let ctx = self.render_context();
                self.columns
                    .iter()
                    .enumerate()
                    .filter(|(_, column)| column.visible)
                    .filter_map(|(col, _)| ctx.cell(row, col))
                    .collect()
            };
            for cell in &cells {
                self.backend.update_cell(cell);
            }
        }
        Ok(())
    }

    /// Change one option at runtime by its camelCase name.
    ///
    /// Options that change geometry (row height, page size, counter, ...)
    /// rebuild the header and the pages.
    pub fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
        let before = self.options.clone();
        self.options.set(name, value)?;
        self.scheduler
            .set_settle_ms(f64::from(self.options.scroll_settle_ms));
        self.typeahead
            .set_reset_ms(f64::from(self.options.typeahead_reset_ms));

        let changed = |a: f64, b: f64| (a - b).abs() > f64::EPSILON;
        let relayout = changed(before.row_height, self.options.row_height)
            || changed(before.header_height, self.options.header_height)
            || before.page_size != self.options.page_size
            || before.show_counter != self.options.show_counter
            || before.show_check != self.options.show_check
            || before.change_columns != self.options.change_columns
            || before.date_format != self.options.date_format;
        if relayout {
            self.render_header();
            self.rebuild_pages();
            self.render_visible();
        } else if before.max_rendered_pages != self.options.max_rendered_pages
            || before.page_buffer != self.options.page_buffer
        {
            self.render_visible();
        }
        Ok(())
    }

    /// Resize the grid. The row container gets the height below the header.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport
            .resize(width, height - self.options.header_height);
        self.render_visible();
    }

    /// Static HTML table of the whole view for printing.
    pub fn print(&self) -> String {
        print_table(&self.render_context())
    }

    /// Recompute the view from the loaded rows: filter, clear checks, resort,
    /// clamp the selection, notify.
    fn refresh_view(&mut self) {
        self.view = self.filters.recompute(&self.rows);
        self.checked.clear();
        self.resort();
        self.location = self
            .location
            .and_then(|l| l.clamped(self.view.len(), self.columns.len()));
        tracing::debug!(
            filters = self.filters.len(),
            filtered = self.view.len(),
            total = self.rows.len(),
            "view recomputed"
        );
        self.events.push(GridEvent::DataChange {
            filtered: self.view.len(),
        });
    }
}

impl<B: GridBackend> std::fmt::Debug for Grid<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows.len())
            .field("view", &self.view.len())
            .field("columns", &self.columns.len())
            .field("filters", &self.filters.len())
            .field("sort", &self.sort)
            .field("pages", &self.pages.page_count())
            .field("location", &self.location)
            .field("checked", &self.checked.len())
            .field("editors", &self.editors)
            .finish_non_exhaustive()
    }
}
