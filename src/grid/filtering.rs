//! Sorting and filtering of the view, plus the data behind the filter pop-ups.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::Grid;
use crate::numfmt::render_value;
use crate::render::GridBackend;
use crate::sort::{sort_values, sort_view};
use crate::types::{js_string, BlanksMode, FilterCriteria, FilterInput, FilterKind};

/// One entry of the list filter pop-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListChoice {
    /// Value as matched by the filter (string form of the raw value)
    pub value: String,
    /// Rendered text shown to the user
    pub label: String,
    pub selected: bool,
}

/// Contents of a column's filter pop-up, reflecting the active filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterPopup {
    #[serde(rename_all = "camelCase")]
    List {
        /// "Show All" is selected (no filter on the column)
        show_all: bool,
        /// "Blanks" is selected
        blanks: bool,
        choices: Vec<ListChoice>,
    },
    Search { text: String },
    #[serde(rename_all = "camelCase")]
    DateRange {
        mode: BlanksMode,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    },
}

/// Drop markup from a value before showing it in the list pop-up.
fn strip_tags(text: &str) -> String {
    if !(text.contains('<') && text.contains('>')) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

impl<B: GridBackend> Grid<B> {
    /// Sort the view by the column at `col`.
    ///
    /// Sorting again on the same column toggles the direction; any other
    /// column sorts ascending. The view is rebuilt from scratch.
    pub fn sort_by(&mut self, col: usize) {
        let Some(column) = self.columns.get(col) else {
            return;
        };
        self.sort.request(column.key(col), false);
        tracing::debug!(col, descending = self.sort.descending, "sort");
        self.apply_sort();
        self.render_header();
        self.rebuild_pages();
        self.render_visible();
    }

    /// Re-apply the active sort after the view was recomputed. Direction is
    /// reset to ascending.
    pub(crate) fn resort(&mut self) {
        if let Some(field) = self.sort.field.clone() {
            self.sort.request(field, true);
            self.apply_sort();
        }
    }

    fn apply_sort(&mut self) {
        let Some(field) = self.sort.field.as_ref() else {
            return;
        };
        let column_type = self
            .columns
            .iter()
            .enumerate()
            .find(|(col, column)| column.key(*col) == *field)
            .map(|(_, column)| column.column_type)
            .unwrap_or_default();
        sort_view(
            &mut self.view,
            &self.rows,
            field,
            column_type,
            self.sort.descending,
        );
    }

    /// Apply a filter pop-up selection to the column at `col`.
    ///
    /// Any previous filter on the column is replaced; a "show all" list
    /// selection or empty search text leaves the column unfiltered. The view
    /// is recomputed from the loaded rows, checked rows are cleared, the sort
    /// is re-applied and the pages are rebuilt.
    pub fn filter_by(&mut self, col: usize, input: FilterInput) {
        let Some(column) = self.columns.get(col) else {
            return;
        };
        let key = column.key(col);
        let filtered = self.filters.apply_input(key, input);
        tracing::debug!(col, filtered, "filter");
        self.refresh_view();
        self.render_header();
        self.rebuild_pages();
        self.render_visible();
    }

    /// Drop every active filter.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.refresh_view();
        self.render_header();
        self.rebuild_pages();
        self.render_visible();
    }

    /// Contents of the filter pop-up for the column at `col`, or `None` when
    /// the column has no filter.
    ///
    /// The list pop-up offers the distinct non-null values of the current
    /// view, sorted, and rendered like cells.
    pub fn filter_popup(&self, col: usize) -> Option<FilterPopup> {
        let column = self.columns.get(col)?;
        let key = column.key(col);
        let active = self.filters.get(&key).map(|f| &f.criteria);

        match column.filter_type {
            FilterKind::None => None,
            FilterKind::List => {
                let mut seen = HashSet::new();
                let mut values: Vec<Value> = self
                    .view
                    .iter()
                    .filter_map(|index| self.rows.get(*index))
                    .filter_map(|row| key.present(row))
                    .filter(|value| seen.insert(js_string(value).into_owned()))
                    .cloned()
                    .collect();
                sort_values(&mut values, column.column_type);

                let (selected, blanks) = match active {
                    Some(FilterCriteria::List {
                        values,
                        include_blanks,
                    }) => (Some(values), *include_blanks),
                    _ => (None, false),
                };
                let choices = values
                    .iter()
                    .map(|value| {
                        let value_text = js_string(value).into_owned();
                        let display = match value {
                            Value::String(s) => Value::String(strip_tags(s)),
                            other => other.clone(),
                        };
                        ListChoice {
                            label: render_value(
                                Some(&display),
                                column,
                                self.dates.as_ref(),
                                &self.options.date_format,
                            ),
                            selected: selected.is_some_and(|s| s.contains(&value_text)),
                            value: value_text,
                        }
                    })
                    .collect();
                Some(FilterPopup::List {
                    show_all: active.is_none(),
                    blanks,
                    choices,
                })
            }
            FilterKind::Search => Some(FilterPopup::Search {
                text: match active {
                    Some(FilterCriteria::Search { needle }) => needle.clone(),
                    _ => String::new(),
                },
            }),
            FilterKind::DateRange => Some(match active {
                Some(FilterCriteria::Blanks) => FilterPopup::DateRange {
                    mode: BlanksMode::Blanks,
                    start_ms: None,
                    end_ms: None,
                },
                Some(FilterCriteria::NonBlanks) => FilterPopup::DateRange {
                    mode: BlanksMode::NonBlanks,
                    start_ms: None,
                    end_ms: None,
                },
                Some(FilterCriteria::DateRange {
                    start_ms,
                    end_ms,
                    has_start,
                    has_end,
                }) => FilterPopup::DateRange {
                    mode: BlanksMode::All,
                    start_ms: has_start.then_some(*start_ms),
                    end_ms: has_end.then_some(*end_ms),
                },
                _ => FilterPopup::DateRange {
                    mode: BlanksMode::All,
                    start_ms: None,
                    end_ms: None,
                },
            }),
        }
    }
}
