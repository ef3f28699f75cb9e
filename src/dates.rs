//! Date parsing and the injectable date formatting capability.
//!
//! Grid data carries dates either as epoch milliseconds or as strings. Strings
//! are tried against a fixed preference order of formats; anything that does
//! not parse becomes `None` and renders as an empty cell. Naive (zone-less)
//! inputs are read as UTC so rendering is stable across hosts.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::Value;

/// Display pattern used when neither the column nor the options override it.
pub const DEFAULT_DATE_PATTERN: &str = "DD-MMM-YYYY";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
];

/// Parse a raw cell value into epoch milliseconds.
///
/// `null`, `"null"` and `""` yield `None`; numbers are taken as epoch millis.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_date(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64),
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parse a date string, trying each supported format in turn.
pub fn parse_date_str(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() || input == "null" {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Formats epoch milliseconds with a display pattern.
///
/// Hosts can inject their own implementation (for locale-aware output); the
/// grid only relies on this one method.
pub trait DateFormatter {
    /// `None` when the timestamp is out of range for the formatter.
    fn format(&self, millis: i64, pattern: &str) -> Option<String>;
}

/// Default formatter understanding moment-style tokens
/// (`YYYY YY MMMM MMM MM M DD D dddd ddd HH H hh h mm m ss s SSS A a`,
/// with `[...]` for literal text).
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentFormatter;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// Longest tokens first so "MMMM" wins over "MM".
const TOKENS: &[&str] = &[
    "YYYY", "MMMM", "dddd", "SSS", "MMM", "ddd", "YY", "MM", "DD", "HH", "hh", "mm", "ss", "M",
    "D", "H", "h", "m", "s", "A", "a",
];

impl DateFormatter for MomentFormatter {
    fn format(&self, millis: i64, pattern: &str) -> Option<String> {
        let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
        let mut out = String::with_capacity(pattern.len() + 8);
        let mut rest = pattern;

        while !rest.is_empty() {
            if let Some(literal) = rest.strip_prefix('[') {
                let end = literal.find(']').unwrap_or(literal.len());
                out.push_str(literal.get(..end).unwrap_or_default());
                rest = literal.get(end + 1..).unwrap_or_default();
                continue;
            }
            if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
                push_token(&mut out, &dt, token);
                rest = rest.get(token.len()..).unwrap_or_default();
                continue;
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        Some(out)
    }
}

fn push_token(out: &mut String, dt: &DateTime<Utc>, token: &str) {
    let month_name = MONTHS
        .get(dt.month0() as usize)
        .copied()
        .unwrap_or_default();
    let weekday_name = WEEKDAYS
        .get(dt.weekday().num_days_from_monday() as usize)
        .copied()
        .unwrap_or_default();
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    match token {
        "YYYY" => out.push_str(&format!("{:04}", dt.year())),
        "YY" => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
        "MMMM" => out.push_str(month_name),
        "MMM" => out.push_str(month_name.get(..3).unwrap_or(month_name)),
        "MM" => out.push_str(&format!("{:02}", dt.month())),
        "M" => out.push_str(&dt.month().to_string()),
        "DD" => out.push_str(&format!("{:02}", dt.day())),
        "D" => out.push_str(&dt.day().to_string()),
        "dddd" => out.push_str(weekday_name),
        "ddd" => out.push_str(weekday_name.get(..3).unwrap_or(weekday_name)),
        "HH" => out.push_str(&format!("{:02}", dt.hour())),
        "H" => out.push_str(&dt.hour().to_string()),
        "hh" => out.push_str(&format!("{hour12:02}")),
        "h" => out.push_str(&hour12.to_string()),
        "mm" => out.push_str(&format!("{:02}", dt.minute())),
        "m" => out.push_str(&dt.minute().to_string()),
        "ss" => out.push_str(&format!("{:02}", dt.second())),
        "s" => out.push_str(&dt.second().to_string()),
        "SSS" => out.push_str(&format!("{:03}", dt.timestamp_subsec_millis())),
        "A" => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
        "a" => out.push_str(if dt.hour() < 12 { "am" } else { "pm" }),
        _ => out.push_str(token),
    }
}
