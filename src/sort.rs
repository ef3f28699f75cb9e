//! Sort engine.
//!
//! Values are compared through a [`SortKey`] decorated once per row, so the
//! comparator itself never parses. Ordering rules:
//! - a missing value (absent, `null`, `""`) sorts after any present value
//! - two numbers (numeric strings included) compare numerically
//! - on date columns, parseable values compare by timestamp
//! - everything else compares as lowercase text
//!
//! Descending negates the whole result, missing values included. Mixed kinds
//! order numbers, then dates, then text so the comparison stays total.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_date;
use crate::types::{as_number, js_string, ColumnType, FieldKey, Row};

/// Current sort field and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: Option<FieldKey>,
    pub descending: bool,
}

impl SortState {
    /// Update the state for a sort request on `field`.
    ///
    /// A user click on the active field toggles the direction. Any other
    /// request, including a re-apply after filtering (`resort`), sorts
    /// ascending on `field`.
    pub fn request(&mut self, field: FieldKey, resort: bool) {
        if !resort && self.field.as_ref() == Some(&field) {
            self.descending = !self.descending;
        } else {
            self.field = Some(field);
            self.descending = false;
        }
    }

    pub fn is_sorted_on(&self, field: &FieldKey) -> bool {
        self.field.as_ref() == Some(field)
    }
}

/// Comparable projection of a raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Date(i64),
    Text(String),
    Missing,
}

impl SortKey {
    /// Decorate a raw value for a column of `column_type`.
    pub fn from_value(value: Option<&Value>, column_type: ColumnType) -> Self {
        let value = match value {
            None | Some(Value::Null) => return Self::Missing,
            Some(Value::String(s)) if s.is_empty() => return Self::Missing,
            Some(value) => value,
        };
        if column_type == ColumnType::Date {
            if let Some(millis) = parse_date(Some(value)) {
                return Self::Date(millis);
            }
        }
        match as_number(value) {
            Some(n) => Self::Number(n),
            None => Self::Text(js_string(value).to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Text(_) => 2,
            Self::Missing => 3,
        }
    }

    /// Ascending comparison; callers reverse for descending.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compare two raw values with the grid's ordering rules.
pub fn compare_values(
    a: Option<&Value>,
    b: Option<&Value>,
    column_type: ColumnType,
    descending: bool,
) -> Ordering {
    let ordering =
        SortKey::from_value(a, column_type).compare(&SortKey::from_value(b, column_type));
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Stable sort of `view` (indices into `rows`) by the value under `key`.
pub fn sort_view(
    view: &mut Vec<usize>,
    rows: &[Row],
    key: &FieldKey,
    column_type: ColumnType,
    descending: bool,
) {
    if view.is_empty() {
        return;
    }
    let mut decorated: Vec<(SortKey, usize)> = view
        .iter()
        .map(|&index| {
            let value = rows.get(index).and_then(|row| key.lookup(row));
            (SortKey::from_value(value, column_type), index)
        })
        .collect();

    decorated.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    view.clear();
    view.extend(decorated.into_iter().map(|(_, index)| index));
}

/// Ascending sort of loose values, used for the list filter pop-up.
pub fn sort_values(values: &mut [Value], column_type: ColumnType) {
    values.sort_by(|a, b| compare_values(Some(a), Some(b), column_type, false));
}
