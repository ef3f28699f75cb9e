//! Filter engine.
//!
//! Holds the ordered list of active per-field filters and recomputes the
//! filtered view from the full dataset. Recomputation is always from scratch:
//! filters compose with AND and never patch a previous result.

use serde_json::Value;

use crate::dates::{parse_date, parse_date_str};
use crate::types::{
    is_blank, js_string, ActiveFilter, BlanksMode, FieldKey, FilterCriteria, FilterInput, Row,
};

/// Lower bound used when a date range has no start.
pub const RANGE_START_DEFAULT: &str = "1900-01-01";

/// Upper bound used when a date range has no end.
pub const RANGE_END_DEFAULT: &str = "2100-01-01";

impl FilterCriteria {
    /// Whether a raw cell value passes this criteria.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Self::List {
                values,
                include_blanks,
            } => {
                let as_text = value.map_or(std::borrow::Cow::Borrowed("undefined"), js_string);
                values.iter().any(|v| *v == as_text) || (*include_blanks && is_blank(value))
            }
            Self::Search { needle } => match value {
                None | Some(Value::Null) => false,
                Some(value) => js_string(value).to_lowercase().contains(needle.as_str()),
            },
            Self::DateRange {
                start_ms, end_ms, ..
            } => parse_date(value).is_some_and(|millis| millis >= *start_ms && millis < *end_ms),
            Self::Blanks => is_blank(value),
            Self::NonBlanks => !is_blank(value),
        }
    }

    /// Build the criteria for a pop-up selection.
    ///
    /// `None` means the selection leaves the field unfiltered: "show all" in a
    /// list, blank search text, or a date range with neither bound.
    pub fn from_input(input: FilterInput) -> Option<Self> {
        match input {
            FilterInput::List {
                values,
                include_blanks,
                show_all,
            } => (!show_all).then_some(Self::List {
                values,
                include_blanks,
            }),
            FilterInput::Search { text } => {
                let needle = text.trim();
                (!needle.is_empty()).then(|| Self::Search {
                    needle: text.to_lowercase(),
                })
            }
            FilterInput::DateRange {
                mode,
                start_ms,
                end_ms,
            } => match mode {
                BlanksMode::Blanks => Some(Self::Blanks),
                BlanksMode::NonBlanks => Some(Self::NonBlanks),
                BlanksMode::All if start_ms.is_none() && end_ms.is_none() => None,
                BlanksMode::All => Some(Self::DateRange {
                    start_ms: start_ms
                        .or_else(|| parse_date_str(RANGE_START_DEFAULT))
                        .unwrap_or(i64::MIN),
                    end_ms: end_ms
                        .or_else(|| parse_date_str(RANGE_END_DEFAULT))
                        .unwrap_or(i64::MAX),
                    has_start: start_ms.is_some(),
                    has_end: end_ms.is_some(),
                }),
            },
        }
    }
}

impl ActiveFilter {
    pub fn matches(&self, row: &Row) -> bool {
        self.criteria.matches(self.field.lookup(row))
    }
}

/// Ordered set of active filters, at most one per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<ActiveFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filter on `field`. A `None` criteria just removes it.
    ///
    /// Returns whether the field ends up filtered.
    pub fn set(&mut self, field: FieldKey, criteria: Option<FilterCriteria>) -> bool {
        self.remove(&field);
        match criteria {
            Some(criteria) => {
                self.filters.push(ActiveFilter { field, criteria });
                true
            }
            None => false,
        }
    }

    /// Apply a pop-up selection for `field`.
    pub fn apply_input(&mut self, field: FieldKey, input: FilterInput) -> bool {
        self.set(field, FilterCriteria::from_input(input))
    }

    pub fn remove(&mut self, field: &FieldKey) -> Option<ActiveFilter> {
        let position = self.filters.iter().position(|f| f.field == *field)?;
        Some(self.filters.remove(position))
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, field: &FieldKey) -> Option<&ActiveFilter> {
        self.filters.iter().find(|f| f.field == *field)
    }

    pub fn is_filtered(&self, field: &FieldKey) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveFilter> {
        self.filters.iter()
    }

    /// AND of every active filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    /// Indices of the rows that pass, in original order.
    pub fn recompute(&self, rows: &[Row]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(index, _)| index)
            .collect()
    }
}
