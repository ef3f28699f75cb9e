//! Render backend trait for the grid's DOM surface.
//!
//! The grid core never touches the DOM directly. It describes what to show with
//! the small virtual-node types below and hands them to a [`GridBackend`],
//! which is the browser DOM in production and a recorder in tests.

use serde::Serialize;

/// Placeholder standing in for a page that is not materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderNode {
    pub page: usize,
    pub height: f64,
    pub width: f64,
}

/// Data needed to render a single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellNode {
    /// Row index in the current view
    pub row: usize,
    /// Column index in the column list (hidden columns included)
    pub col: usize,
    pub text: String,
    /// Base class, optional column class, then the column type
    pub classes: Vec<String>,
    pub width: f64,
    pub height: f64,
}

/// Row counter cell with an optional check box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterNode {
    pub row: usize,
    /// 1-based row number shown to the user
    pub number: usize,
    /// `Some(checked)` when check boxes are enabled
    pub check: Option<bool>,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowNode {
    pub row: usize,
    pub selected: bool,
    pub counter: Option<CounterNode>,
    pub cells: Vec<CellNode>,
}

/// One materialized page: every row of the page, visible columns only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageNode {
    pub page: usize,
    pub rows: Vec<RowNode>,
}

/// Consecutive pages replacing their placeholders in one DOM mutation:
/// the pages are inserted before the placeholder of the first page, then
/// every placeholder of the run is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRun {
    pub pages: Vec<PageNode>,
}

impl PageRun {
    pub fn first_page(&self) -> Option<usize> {
        self.pages.first().map(|p| p.page)
    }
}

/// Everything a single render-visible pass materializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageBatch {
    pub runs: Vec<PageRun>,
}

impl PageBatch {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageNode> {
        self.runs.iter().flat_map(|run| run.pages.iter())
    }
}

/// Sort indicator on a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortIndicator {
    /// Ascending
    Down,
    /// Descending
    Up,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCellNode {
    pub col: usize,
    pub name: String,
    pub width: f64,
    pub sort: Option<SortIndicator>,
    /// Whether the column offers a filter pop-up
    pub filterable: bool,
    /// Whether a filter is active on the column
    pub filtered: bool,
}

/// The fixed header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderNode {
    pub height: f64,
    pub counter_width: Option<f64>,
    pub cells: Vec<HeaderCellNode>,
    /// Show the column settings button
    pub settings_button: bool,
}

/// Screen rectangle of a cell, handed to editors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Trait for grid surfaces
///
/// Implementations apply the grid's structural changes. Every method is a
/// complete mutation; the grid never reads layout back except through
/// [`GridBackend::cell_rect`].
pub trait GridBackend {
    /// Drop every page and placeholder, then lay out `placeholders` in order.
    fn reset_pages(&mut self, placeholders: &[PlaceholderNode]);

    /// Swap placeholders for materialized pages, one batched insert per run.
    fn materialize(&mut self, batch: &PageBatch);

    /// Return materialized pages to placeholders (LRU eviction).
    fn evict(&mut self, placeholders: &[PlaceholderNode]);

    /// Replace the header row.
    fn render_header(&mut self, header: &HeaderNode);

    /// Patch one materialized cell in place. Unknown cells are ignored.
    fn update_cell(&mut self, cell: &CellNode);

    /// Move the selected-row highlight.
    fn set_selected_row(&mut self, row: Option<usize>);

    /// Reflect a row's checked state on its check box.
    fn set_row_checked(&mut self, row: usize, checked: bool);

    /// Resize every materialized cell of column `col`.
    fn set_column_width(&mut self, col: usize, width: f64);

    /// Scroll the row container vertically.
    fn set_scroll_top(&mut self, scroll_top: f64);

    /// Sync the header's horizontal scroll with the row container.
    fn set_header_scroll_left(&mut self, scroll_left: f64);

    /// On-screen rectangle of a materialized cell, if the backend can measure it.
    fn cell_rect(&self, _row: usize, _col: usize) -> Option<CellRect> {
        None
    }
}

/// Backend that draws nothing. Used for headless work: printing, the CLI and
/// benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl GridBackend for NullBackend {
    fn reset_pages(&mut self, _placeholders: &[PlaceholderNode]) {}
    fn materialize(&mut self, _batch: &PageBatch) {}
    fn evict(&mut self, _placeholders: &[PlaceholderNode]) {}
    fn render_header(&mut self, _header: &HeaderNode) {}
    fn update_cell(&mut self, _cell: &CellNode) {}
    fn set_selected_row(&mut self, _row: Option<usize>) {}
    fn set_row_checked(&mut self, _row: usize, _checked: bool) {}
    fn set_column_width(&mut self, _col: usize, _width: f64) {}
    fn set_scroll_top(&mut self, _scroll_top: f64) {}
    fn set_header_scroll_left(&mut self, _scroll_left: f64) {}
}
