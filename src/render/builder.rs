//! Builds the virtual nodes handed to a [`GridBackend`](super::GridBackend).
//!
//! Every function here is pure: it reads grid state through a
//! [`RenderContext`] and produces nodes. Cell text goes through
//! [`render_value`], classes are recomputed on every build so dynamic class
//! callbacks see the current value.

use std::collections::HashSet;

use serde_json::Value;

use super::backend::{
    CellNode, CounterNode, HeaderCellNode, HeaderNode, PageBatch, PageNode, PageRun,
    PlaceholderNode, RowNode, SortIndicator,
};
use crate::dates::DateFormatter;
use crate::filter::FilterSet;
use crate::layout::{contiguous_runs, PageMask};
use crate::numfmt::render_value;
use crate::sort::SortState;
use crate::types::{visible_width, Column, FilterKind, GridOptions, Row};

/// Class on every data cell.
pub const CELL_CLASS: &str = "dyngrid-cell";
/// Class on the counter cell.
pub const COUNTER_CLASS: &str = "dyngrid-counter";
/// Class on a materialized page block.
pub const PAGE_CLASS: &str = "dyngrid-page";
/// Class on a placeholder block.
pub const PLACEHOLDER_CLASS: &str = "dyngrid-placeholder";
/// Class on the selected row.
pub const SELECTED_CLASS: &str = "dyngrid-selected";

/// Read-only view of the grid state needed to build rows.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub options: &'a GridOptions,
    pub columns: &'a [Column],
    /// All loaded rows
    pub rows: &'a [Row],
    /// Current view as indices into `rows`
    pub view: &'a [usize],
    /// Checked rows, as indices into `rows`
    pub checked: &'a HashSet<usize>,
    /// Selected view row
    pub selected: Option<usize>,
    pub dates: &'a dyn DateFormatter,
}

impl<'a> RenderContext<'a> {
    /// The record shown at view row `row`.
    pub fn row(&self, row: usize) -> Option<&'a Row> {
        self.view.get(row).and_then(|index| self.rows.get(*index))
    }

    /// Raw value of a cell.
    pub fn raw_value(&self, row: usize, col: usize) -> Option<&'a Value> {
        let column = self.columns.get(col)?;
        column.key(col).lookup(self.row(row)?)
    }

    /// Displayed text of a cell.
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        let Some(column) = self.columns.get(col) else {
            return String::new();
        };
        render_value(
            self.raw_value(row, col),
            column,
            self.dates,
            &self.options.date_format,
        )
    }

    /// Node for one cell, hidden columns included.
    pub fn cell(&self, row: usize, col: usize) -> Option<CellNode> {
        let column = self.columns.get(col)?;
        self.row(row)?;
        let raw = self.raw_value(row, col);
        let text = render_value(raw, column, self.dates, &self.options.date_format);
        let classes = cell_classes(column, raw, &text);
        Some(CellNode {
            row,
            col,
            text,
            classes,
            width: f64::from(column.width) - 1.0,
            height: self.options.row_height,
        })
    }

    fn counter(&self, row: usize) -> Option<CounterNode> {
        let width = self.options.counter_width()?;
        let check = self.options.show_check.then(|| {
            self.view
                .get(row)
                .is_some_and(|index| self.checked.contains(index))
        });
        Some(CounterNode {
            row,
            number: row + 1,
            check,
            width,
            height: self.options.row_height,
        })
    }

    /// Node for one row: the counter cell, then every visible column.
    pub fn row_node(&self, row: usize) -> Option<RowNode> {
        self.row(row)?;
        let cells = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.visible)
            .filter_map(|(col, _)| self.cell(row, col))
            .collect();
        Some(RowNode {
            row,
            selected: self.selected == Some(row),
            counter: self.counter(row),
            cells,
        })
    }

    pub fn page(&self, pages: &PageMask, page: usize) -> PageNode {
        PageNode {
            page,
            rows: pages
                .row_range(page)
                .filter_map(|row| self.row_node(row))
                .collect(),
        }
    }

    /// Group `pending` pages (ascending) into runs of consecutive pages.
    pub fn batch(&self, pages: &PageMask, pending: &[usize]) -> PageBatch {
        PageBatch {
            runs: contiguous_runs(pending)
                .into_iter()
                .map(|run| PageRun {
                    pages: run.map(|page| self.page(pages, page)).collect(),
                })
                .collect(),
        }
    }
}

/// Placeholder for one page.
pub fn placeholder(pages: &PageMask, columns: &[Column], page: usize) -> PlaceholderNode {
    PlaceholderNode {
        page,
        height: pages.page_height(page),
        width: f64::from(visible_width(columns)),
    }
}

/// One placeholder per page, in page order.
pub fn placeholders(pages: &PageMask, columns: &[Column]) -> Vec<PlaceholderNode> {
    (0..pages.page_count())
        .map(|page| placeholder(pages, columns, page))
        .collect()
}

/// Base class, the column's extra class if any, then the column type.
pub fn cell_classes(column: &Column, raw: Option<&Value>, text: &str) -> Vec<String> {
    let mut classes = vec![CELL_CLASS.to_string()];
    if let Some(extra) = column
        .css_class
        .as_ref()
        .and_then(|css| css.resolve(column, raw, text))
    {
        classes.extend(extra.split_whitespace().map(str::to_string));
    }
    classes.push(column.column_type.as_str().to_string());
    classes
}

/// The header row for the visible columns.
pub fn header(
    options: &GridOptions,
    columns: &[Column],
    sort: &SortState,
    filters: &FilterSet,
) -> HeaderNode {
    let cells = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.visible)
        .map(|(col, column)| {
            let key = column.key(col);
            let sort = sort.is_sorted_on(&key).then_some(if sort.descending {
                SortIndicator::Up
            } else {
                SortIndicator::Down
            });
            HeaderCellNode {
                col,
                name: column.name.clone(),
                width: f64::from(column.width) - 1.0,
                sort,
                filterable: column.filter_type != FilterKind::None,
                filtered: filters.is_filtered(&key),
            }
        })
        .collect();
    HeaderNode {
        height: options.header_height,
        counter_width: options.counter_width().map(|w| w + 1.0),
        cells,
        settings_button: options.change_columns,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::dates::MomentFormatter;
    use crate::types::{ColumnType, CssClass, FieldKey, FilterCriteria};
    use serde_json::json;
    use std::rc::Rc;

    struct Fixture {
        options: GridOptions,
        columns: Vec<Column>,
        rows: Vec<Row>,
        view: Vec<usize>,
        checked: HashSet<usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                options: GridOptions::default(),
                columns: vec![
                    Column::new("name", "Name"),
                    Column::new("qty", "Qty").with_type(ColumnType::Number),
                    Column::new("hidden", "Hidden").with_visible(false),
                ],
                rows: vec![
                    json!({"name": "apple", "qty": 3, "hidden": "x"}),
                    json!({"name": "pear", "qty": null}),
                ],
                view: vec![1, 0],
                checked: HashSet::new(),
            }
        }

        fn context(&self) -> RenderContext<'_> {
            RenderContext {
                options: &self.options,
                columns: &self.columns,
                rows: &self.rows,
                view: &self.view,
                checked: &self.checked,
                selected: Some(1),
                dates: &MomentFormatter,
            }
        }
    }

    #[test]
    fn test_row_follows_view_order() {
        let fixture = Fixture::new();
        let row = fixture.context().row_node(0).unwrap();
        let texts: Vec<&str> = row.cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["pear", ""]);
        assert!(!row.selected);
        assert!(row.counter.is_none());
    }

    #[test]
    fn test_hidden_columns_are_skipped() {
        let fixture = Fixture::new();
        let row = fixture.context().row_node(1).unwrap();
        assert_eq!(row.cells.len(), 2);
        assert!(row.selected);
        assert_eq!(row.cells[1].col, 1);
        assert_eq!(row.cells[1].width, 99.0);
        assert_eq!(row.cells[1].classes, vec!["dyngrid-cell", "number"]);
    }

    #[test]
    fn test_counter_with_check() {
        let mut fixture = Fixture::new();
        fixture.options.show_counter = true;
        fixture.options.show_check = true;
        fixture.checked.insert(0);
        let counter = fixture.context().row_node(1).unwrap().counter.unwrap();
        assert_eq!(counter.number, 2);
        assert_eq!(counter.check, Some(true));
        assert_eq!(counter.width, 60.0);
    }

    #[test]
    fn test_dynamic_class_sees_raw_and_text() {
        let mut fixture = Fixture::new();
        fixture.columns[1].css_class = Some(CssClass::Dynamic(Rc::new(|_, raw, text| {
            (raw.and_then(Value::as_f64).unwrap_or(0.0) > 2.0).then(|| format!("big v{text}"))
        })));
        let cell = fixture.context().cell(1, 1).unwrap();
        assert_eq!(cell.classes, vec!["dyngrid-cell", "big", "v3", "number"]);
        let cell = fixture.context().cell(0, 1).unwrap();
        assert_eq!(cell.classes, vec!["dyngrid-cell", "number"]);
    }

    #[test]
    fn test_batch_groups_consecutive_pages() {
        let mut fixture = Fixture::new();
        fixture.rows = (0..10).map(|i| json!({"name": i})).collect();
        fixture.view = (0..10).collect();
        let pages = PageMask::rebuild(10, 2, 35.0);
        let batch = fixture.context().batch(&pages, &[0, 1, 3]);
        assert_eq!(batch.runs.len(), 2);
        assert_eq!(batch.runs[0].first_page(), Some(0));
        assert_eq!(batch.runs[1].first_page(), Some(3));
        assert_eq!(batch.pages().map(|p| p.rows.len()).sum::<usize>(), 6);
    }

    #[test]
    fn test_placeholders_cover_every_page() {
        let fixture = Fixture::new();
        let pages = PageMask::rebuild(120, 50, 35.0);
        let nodes = placeholders(&pages, &fixture.columns);
        let heights: Vec<f64> = nodes.iter().map(|p| p.height).collect();
        assert_eq!(heights, vec![1750.0, 1750.0, 700.0]);
        assert_eq!(nodes[0].width, 200.0);
    }

    #[test]
    fn test_header_marks_sort_and_filter() {
        let fixture = Fixture::new();
        let mut sort = SortState::default();
        sort.request(FieldKey::Name("qty".into()), false);
        sort.request(FieldKey::Name("qty".into()), false);
        let mut filters = FilterSet::new();
        filters.set(
            FieldKey::Name("name".into()),
            Some(FilterCriteria::Search {
                needle: "a".into(),
            }),
        );
        let header = header(&fixture.options, &fixture.columns, &sort, &filters);
        assert_eq!(header.cells.len(), 2);
        assert!(header.cells[0].filtered);
        assert_eq!(header.cells[0].sort, None);
        assert_eq!(header.cells[1].sort, Some(SortIndicator::Up));
        assert_eq!(header.counter_width, None);
    }
}
