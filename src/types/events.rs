use serde::Serialize;

use super::Row;

/// Notifications the grid emits to its host.
///
/// Events are queued while the grid handles an input and drained by the host
/// afterwards, so listeners never run while grid state is borrowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GridEvent {
    /// A row became the active row (click, keyboard, editor navigation).
    #[serde(rename_all = "camelCase")]
    RowSelect { row_index: usize, row: Row },
    /// A cell was double clicked.
    #[serde(rename_all = "camelCase")]
    RowDoubleClick { row_index: usize, row: Row },
    /// The filtered view was recomputed (load, filter, clear).
    DataChange { filtered: usize },
}

/// Row totals before and after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub filtered: usize,
}
