//! Common test utilities: a recording backend and dataset builders.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::BTreeSet;

use dyngrid::render::{CellNode, CellRect, HeaderNode, PageBatch, PlaceholderNode};
use dyngrid::{Column, ColumnType, FilterKind, Grid, GridBackend, GridOptions, Row, SettingsMode};
use serde_json::json;

// ============================================================================
// Recording backend
// ============================================================================

/// One backend mutation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset(Vec<PlaceholderNode>),
    Materialize(PageBatch),
    Evict(Vec<PlaceholderNode>),
    Header(HeaderNode),
    UpdateCell(CellNode),
    Selected(Option<usize>),
    Checked(usize, bool),
    ColumnWidth(usize, f64),
    ScrollTop(f64),
    HeaderScrollLeft(f64),
}

/// Backend that records every call and tracks which pages are materialized.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    /// Pages currently materialized
    pub rendered: BTreeSet<usize>,
    /// Placeholders currently laid out
    pub placeholders: BTreeSet<usize>,
    pub header: Option<HeaderNode>,
    pub selected: Option<usize>,
    pub scroll_top: f64,
    /// Fixed rectangle reported for every cell, if set
    pub rect: Option<CellRect>,
}

impl RecordingBackend {
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Every batch handed to `materialize`, in order.
    pub fn batches(&self) -> Vec<&PageBatch> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Materialize(batch) => Some(batch),
                _ => None,
            })
            .collect()
    }

    /// Every cell patched in place, in order.
    pub fn updated_cells(&self) -> Vec<&CellNode> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::UpdateCell(cell) => Some(cell),
                _ => None,
            })
            .collect()
    }

    pub fn rendered_pages(&self) -> Vec<usize> {
        self.rendered.iter().copied().collect()
    }
}

impl GridBackend for RecordingBackend {
    fn reset_pages(&mut self, placeholders: &[PlaceholderNode]) {
        self.rendered.clear();
        self.placeholders = placeholders.iter().map(|p| p.page).collect();
        self.calls.push(Call::Reset(placeholders.to_vec()));
    }

    fn materialize(&mut self, batch: &PageBatch) {
        for page in batch.pages() {
            assert!(
                self.placeholders.remove(&page.page),
                "page {} materialized without a placeholder",
                page.page
            );
            self.rendered.insert(page.page);
        }
        self.calls.push(Call::Materialize(batch.clone()));
    }

    fn evict(&mut self, placeholders: &[PlaceholderNode]) {
        for placeholder in placeholders {
            self.rendered.remove(&placeholder.page);
            self.placeholders.insert(placeholder.page);
        }
        self.calls.push(Call::Evict(placeholders.to_vec()));
    }

    fn render_header(&mut self, header: &HeaderNode) {
        self.header = Some(header.clone());
        self.calls.push(Call::Header(header.clone()));
    }

    fn update_cell(&mut self, cell: &CellNode) {
        self.calls.push(Call::UpdateCell(cell.clone()));
    }

    fn set_selected_row(&mut self, row: Option<usize>) {
        self.selected = row;
        self.calls.push(Call::Selected(row));
    }

    fn set_row_checked(&mut self, row: usize, checked: bool) {
        self.calls.push(Call::Checked(row, checked));
    }

    fn set_column_width(&mut self, col: usize, width: f64) {
        self.calls.push(Call::ColumnWidth(col, width));
    }

    fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top;
        self.calls.push(Call::ScrollTop(scroll_top));
    }

    fn set_header_scroll_left(&mut self, scroll_left: f64) {
        self.calls.push(Call::HeaderScrollLeft(scroll_left));
    }

    fn cell_rect(&self, _row: usize, _col: usize) -> Option<CellRect> {
        self.rect
    }
}

// ============================================================================
// Datasets
// ============================================================================

/// `count` keyed rows: `{"id": i, "name": "row i"}`.
pub fn numbered_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| json!({"id": i, "name": format!("row {i}")}))
        .collect()
}

pub fn numbered_columns() -> Vec<Column> {
    vec![
        Column::new("id", "Id").with_type(ColumnType::Number),
        Column::new("name", "Name").with_filter(FilterKind::Search),
    ]
}

/// A small mixed dataset with blanks in every column.
pub fn people() -> Vec<Row> {
    vec![
        json!({"name": "Alice", "team": "A", "age": 34, "joined": "2021-03-15", "active": true}),
        json!({"name": "Bob", "team": "B", "age": 27, "joined": "2019-11-02", "active": false}),
        json!({"name": "Carol", "team": "C", "age": null, "joined": null, "active": "Y"}),
        json!({"name": "Dave", "team": null, "age": 45, "joined": "2022-07-30", "active": 1}),
        json!({"name": "Erin", "team": "A", "age": 31, "joined": "2020-01-09", "active": 0}),
    ]
}

pub fn people_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name").with_filter(FilterKind::Search),
        Column::new("team", "Team"),
        Column::new("age", "Age").with_type(ColumnType::Number),
        Column::new("joined", "Joined")
            .with_type(ColumnType::Date)
            .with_filter(FilterKind::DateRange),
        Column::new("active", "Active").with_type(ColumnType::Boolean),
    ]
}

pub fn options() -> GridOptions {
    GridOptions {
        settings: SettingsMode::None,
        ..GridOptions::default()
    }
}

/// Loaded grid over a recording backend, settings persistence off.
pub fn grid(rows: Vec<Row>, columns: Vec<Column>) -> Grid<RecordingBackend> {
    grid_with(rows, columns, options())
}

pub fn grid_with(rows: Vec<Row>, columns: Vec<Column>, options: GridOptions) -> Grid<RecordingBackend> {
    let mut grid = Grid::new(RecordingBackend::default(), options).unwrap();
    grid.set_data(rows, Some(columns), false);
    grid
}

/// The given column's raw value for every row of the view.
pub fn column_values(grid: &Grid<RecordingBackend>, field: &str) -> Vec<serde_json::Value> {
    grid.data()
        .into_iter()
        .map(|row| row.get(field).cloned().unwrap_or(serde_json::Value::Null))
        .collect()
}
