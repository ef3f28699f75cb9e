//! Cell value rendering
//!
//! Converts a raw cell value plus the column's type and format into the text
//! shown in the grid. Rules by column type:
//! - `null` or the literal string `"null"` renders as an empty string
//! - `number`: plain, `default-decimal` (2 places with thousands separators)
//!   or `time` (minutes since midnight as `H:MM`)
//! - `date`: parsed then handed to the injected [`DateFormatter`]
//! - `boolean`: `Yes` for truthy values, `No` otherwise
//! - anything else: string coercion

use serde_json::Value;

use crate::dates::{parse_date, DateFormatter};
use crate::types::{as_number, js_number, js_string, Column, ColumnType};

/// Number format: two decimals with thousands separators.
pub const FORMAT_DEFAULT_DECIMAL: &str = "default-decimal";

/// Number format: minutes since midnight shown as `H:MM`.
pub const FORMAT_TIME: &str = "time";

/// Render a raw value for display in `column`.
///
/// `default_pattern` is the grid-wide date pattern used when the column does
/// not set its own.
pub fn render_value(
    raw: Option<&Value>,
    column: &Column,
    dates: &dyn DateFormatter,
    default_pattern: &str,
) -> String {
    let value = match raw {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) if s == "null" => return String::new(),
        Some(value) => value,
    };

    match column.column_type {
        ColumnType::Number => render_number(value, column.format.as_deref()),
        ColumnType::Date => parse_date(Some(value))
            .and_then(|millis| {
                dates.format(millis, column.date_pattern().unwrap_or(default_pattern))
            })
            .unwrap_or_default(),
        ColumnType::Boolean => render_boolean(value).to_string(),
        ColumnType::Text => js_string(value).into_owned(),
    }
}

fn render_number(value: &Value, format: Option<&str>) -> String {
    // Non-numeric content in a number column is shown as-is.
    let Some(number) = as_number(value) else {
        return js_string(value).into_owned();
    };
    match format {
        Some(FORMAT_DEFAULT_DECIMAL) => render_decimal(number),
        Some(FORMAT_TIME) => render_time(number),
        _ => match value {
            Value::String(s) => s.clone(),
            _ => js_number(number),
        },
    }
}

/// Two decimals with a comma every three digits left of the decimal point.
pub fn render_decimal(value: f64) -> String {
    format_with_thousands(value, 2)
}

fn format_with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (formatted.as_str(), None),
    };

    let mut with_sep = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            with_sep.push(',');
        }
        with_sep.push(c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match dec_part {
        Some(dec) => format!("{sign}{with_sep}.{dec}"),
        None => format!("{sign}{with_sep}"),
    }
}

/// Minutes since midnight as `H:MM`.
///
/// Hours are `floor(v / 60)` and minutes `|v % 60|`, so negative inputs keep
/// the floored hour: `-65` renders as `-2:05`. Fractional minutes are floored
/// to keep the two-digit field.
pub fn render_time(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor();
    let rest = (minutes % 60.0).abs().floor();
    format!("{}:{rest:02.0}", js_number(hours))
}

/// `Yes` for `true`, `1`, `"1"` and `"Y"`; `No` for everything else.
pub fn render_boolean(value: &Value) -> &'static str {
    let truthy = match value {
        Value::Bool(b) => *b,
        Value::String(s) if s == "Y" => true,
        Value::Number(_) | Value::String(_) => {
            as_number(value).is_some_and(|n| (n - 1.0).abs() < f64::EPSILON)
        }
        _ => false,
    };
    if truthy {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dates::MomentFormatter;
    use serde_json::json;

    fn render(raw: Value, column: &Column) -> String {
        render_value(Some(&raw), column, &MomentFormatter, "DD-MMM-YYYY")
    }

    #[test]
    fn test_decimal_thousands() {
        assert_eq!(render_decimal(1_234_567.5), "1,234,567.50");
        assert_eq!(render_decimal(999.999), "1,000.00");
        assert_eq!(render_decimal(12.0), "12.00");
        assert_eq!(render_decimal(-1234.5), "-1,234.50");
        assert_eq!(render_decimal(-0.001), "0.00");
    }

    #[test]
    fn test_time_minutes() {
        assert_eq!(render_time(0.0), "0:00");
        assert_eq!(render_time(125.0), "2:05");
        assert_eq!(render_time(600.0), "10:00");
        assert_eq!(render_time(-65.0), "-2:05");
        assert_eq!(render_time(65.5), "1:05");
    }

    #[test]
    fn test_null_renders_empty() {
        let column = Column::new("a", "A").with_type(ColumnType::Number);
        assert_eq!(render(json!(null), &column), "");
        assert_eq!(render(json!("null"), &column), "");
        assert_eq!(render_value(None, &column, &MomentFormatter, "DD"), "");
    }

    #[test]
    fn test_number_formats() {
        let plain = Column::new("a", "A").with_type(ColumnType::Number);
        assert_eq!(render(json!(42), &plain), "42");
        assert_eq!(render(json!(2.5), &plain), "2.5");
        let decimal = plain.clone().with_format(FORMAT_DEFAULT_DECIMAL);
        assert_eq!(render(json!("1234"), &decimal), "1,234.00");
        assert_eq!(render(json!("abc"), &decimal), "abc");
    }

    #[test]
    fn test_boolean_truthiness() {
        for truthy in [json!(true), json!(1), json!("1"), json!("Y")] {
            assert_eq!(render_boolean(&truthy), "Yes", "{truthy}");
        }
        for falsy in [json!(false), json!(0), json!("N"), json!("yes"), json!([])] {
            assert_eq!(render_boolean(&falsy), "No", "{falsy}");
        }
    }

    #[test]
    fn test_date_column_uses_own_pattern() {
        let column = Column::new("d", "D")
            .with_type(ColumnType::Date)
            .with_format("YYYY/MM/DD");
        assert_eq!(render(json!("2024-01-05"), &column), "2024/01/05");
        assert_eq!(render(json!("garbage"), &column), "");
    }
}
