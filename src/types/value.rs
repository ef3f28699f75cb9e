//! Row records and raw cell values.
//!
//! Rows are application-supplied JSON records, either positional (`[..]`) or
//! keyed (`{..}`). The grid never interprets them beyond field/index access.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single application record.
pub type Row = Value;

/// How a column addresses its value inside a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldKey {
    /// Keyed access (`row[field]`).
    Name(String),
    /// Positional access (`row[index]`).
    Index(usize),
}

impl FieldKey {
    /// Look up the raw value this key addresses. `null` is returned as-is.
    pub fn lookup<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        match (self, row) {
            (Self::Name(name), Value::Object(map)) => map.get(name),
            (Self::Name(name), Value::Array(items)) => {
                name.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            (Self::Index(i), Value::Array(items)) => items.get(*i),
            (Self::Index(i), Value::Object(map)) => map.get(&i.to_string()),
            _ => None,
        }
    }

    /// Look up a value, treating JSON `null` the same as an absent field.
    pub fn present<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        self.lookup(row).filter(|v| !v.is_null())
    }

    /// Write `value` into the row at this key.
    ///
    /// Positional rows are padded with `null` when the index is past the end.
    /// Scalar rows are left untouched.
    pub fn assign(&self, row: &mut Row, value: Value) {
        match (self, row) {
            (Self::Name(name), Value::Object(map)) => {
                map.insert(name.clone(), value);
            }
            (Self::Index(i), Value::Object(map)) => {
                map.insert(i.to_string(), value);
            }
            (Self::Index(i), Value::Array(items)) => set_position(items, *i, value),
            (Self::Name(name), Value::Array(items)) => {
                if let Ok(i) = name.parse::<usize>() {
                    set_position(items, i, value);
                }
            }
            _ => {}
        }
    }
}

fn set_position(items: &mut Vec<Value>, index: usize, value: Value) {
    if items.len() <= index {
        items.resize(index + 1, Value::Null);
    }
    if let Some(slot) = items.get_mut(index) {
        *slot = value;
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// True for `null`, a missing field, or the empty string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Format a number the way a browser's `Number.prototype.toString` would for
/// the common cases: integral values without a fraction, `-0` as `0`.
pub fn js_number(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        return format!("{value:.0}");
    }
    format!("{value}")
}

/// String coercion of a raw value (`value + ""`).
pub fn js_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(n.as_f64().map_or_else(|| n.to_string(), js_number)),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => js_string(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Numeric coercion: numbers, booleans and strings that parse as finite numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Text projection of a whole row used for type-ahead matching.
///
/// Positional rows are joined with commas, keyed rows are serialized as JSON.
pub fn row_projection(row: &Row) -> String {
    match row {
        Value::Array(_) => js_string(row).into_owned(),
        other => other.to_string(),
    }
}
