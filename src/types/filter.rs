use serde::{Deserialize, Serialize};

use super::FieldKey;

/// An active filter on one field. At most one exists per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub field: FieldKey,
    pub criteria: FilterCriteria,
}

/// Inclusion predicate payload of an active filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterCriteria {
    /// Value (as string) is one of `values`, or blank when `include_blanks`.
    #[serde(rename_all = "camelCase")]
    List {
        values: Vec<String>,
        include_blanks: bool,
    },
    /// Case-insensitive substring; `needle` is stored lowercased.
    Search { needle: String },
    /// Parsed date within `[start_ms, end_ms)`.
    #[serde(rename_all = "camelCase")]
    DateRange {
        start_ms: i64,
        end_ms: i64,
        has_start: bool,
        has_end: bool,
    },
    Blanks,
    NonBlanks,
}

/// What the user picked in a filter pop-up, before it becomes an [`ActiveFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterInput {
    /// List pop-up selection. `show_all` leaves the field unfiltered.
    #[serde(rename_all = "camelCase")]
    List {
        #[serde(default)]
        values: Vec<String>,
        #[serde(default)]
        include_blanks: bool,
        #[serde(default)]
        show_all: bool,
    },
    /// Search text. Blank text leaves the field unfiltered.
    Search {
        #[serde(default)]
        text: String,
    },
    /// Date range pop-up. `mode` selects all/blanks/non-blanks; bounds apply in
    /// `All` mode only and a missing bound is open.
    #[serde(rename_all = "camelCase")]
    DateRange {
        #[serde(default)]
        mode: BlanksMode,
        #[serde(default)]
        start_ms: Option<i64>,
        #[serde(default)]
        end_ms: Option<i64>,
    },
}

/// The All / Blanks / Non-Blanks radio of the date range pop-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlanksMode {
    #[default]
    All,
    Blanks,
    NonBlanks,
}
