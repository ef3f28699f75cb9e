use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};

/// Which column-settings store the grid builds for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsMode {
    /// Persist width/visibility in the browser's local storage.
    #[default]
    Local,
    /// Do not persist anything.
    None,
}

/// Grid configuration. Every field has a default so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    /// Grow to the parent's inner size.
    pub fill_parent: bool,
    /// Height of every data row (pixels).
    pub row_height: f64,
    /// Height of the fixed header (pixels).
    pub header_height: f64,
    /// Rows per page; pages are the unit of materialization.
    pub page_size: usize,
    /// Pages rendered on each side of the page under the scroll position.
    pub page_buffer: usize,
    /// Show a 1-based row counter column.
    pub show_counter: bool,
    /// Show a row checkbox inside the counter column.
    pub show_check: bool,
    /// Show the column settings button in the header.
    pub change_columns: bool,
    /// Default date display pattern (moment-style tokens).
    pub date_format: String,
    /// Keep at most this many materialized pages; `None` never evicts.
    pub max_rendered_pages: Option<usize>,
    /// Period of the scroll poll (ms).
    pub scroll_poll_ms: u32,
    /// Quiet time after the last scroll event before rendering (ms).
    pub scroll_settle_ms: u32,
    /// Inactivity after which the type-ahead buffer resets (ms).
    pub typeahead_reset_ms: u32,
    /// Debounce applied to search filter keystrokes (ms).
    pub search_debounce_ms: u32,
    pub settings: SettingsMode,
    /// Key prefix for persisted column settings.
    pub settings_prefix: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            fill_parent: true,
            row_height: 35.0,
            header_height: 35.0,
            page_size: 50,
            page_buffer: 1,
            show_counter: false,
            show_check: false,
            change_columns: false,
            date_format: crate::dates::DEFAULT_DATE_PATTERN.to_string(),
            max_rendered_pages: None,
            scroll_poll_ms: 250,
            scroll_settle_ms: 10,
            typeahead_reset_ms: 1000,
            search_debounce_ms: 150,
            settings: SettingsMode::Local,
            settings_prefix: "dynamic-table.".to_string(),
        }
    }
}

impl GridOptions {
    /// Reject configurations the paging math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GridError::InvalidOptions("pageSize must be at least 1".into()));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(GridError::InvalidOptions("rowHeight must be positive".into()));
        }
        if !(self.header_height.is_finite() && self.header_height >= 0.0) {
            return Err(GridError::InvalidOptions("headerHeight must not be negative".into()));
        }
        if self.max_rendered_pages == Some(0) {
            return Err(GridError::InvalidOptions(
                "maxRenderedPages must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Width of the counter column, if shown.
    pub fn counter_width(&self) -> Option<f64> {
        self.show_counter
            .then(|| if self.show_check { 60.0 } else { 40.0 })
    }

    /// Set one option by its camelCase name. Unknown names are a usage error.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let mut object = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => return Err(GridError::InvalidOptions("options are not an object".into())),
        };
        if !object.contains_key(name) {
            return Err(GridError::UnknownOperation(format!("option {name}")));
        }
        object.insert(name.to_string(), value);
        let updated: Self = serde_json::from_value(Value::Object(object))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: GridOptions = serde_json::from_value(json!({"pageSize": 10})).unwrap();
        assert_eq!(options.page_size, 10);
        assert_eq!(options.row_height, 35.0);
        assert_eq!(options.page_buffer, 1);
    }

    #[test]
    fn test_set_known_option() {
        let mut options = GridOptions::default();
        options.set("showCounter", json!(true)).unwrap();
        assert!(options.show_counter);
    }

    #[test]
    fn test_set_unknown_option_is_usage_error() {
        let mut options = GridOptions::default();
        let err = options.set("bogus", json!(1)).unwrap_err();
        assert!(matches!(err, GridError::UnknownOperation(_)));
    }

    #[test]
    fn test_set_invalid_value_keeps_previous() {
        let mut options = GridOptions::default();
        assert!(options.set("pageSize", json!(0)).is_err());
        assert_eq!(options.page_size, 50);
    }
}
