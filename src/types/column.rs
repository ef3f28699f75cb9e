use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::FieldKey;
use crate::editor::CellEditor;

/// Narrowest width a column can be dragged or configured to (pixels).
pub const MIN_COLUMN_WIDTH: u32 = 40;

/// Width applied to columns that do not declare one.
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

/// Value type of a column; drives rendering and the cell's CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Number,
    Date,
    Boolean,
    #[default]
    #[serde(other)]
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }
}

/// Which filter pop-up a column offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    #[default]
    List,
    Search,
    DateRange,
    #[serde(other)]
    None,
}

/// Signature of a dynamic class callback: `(column, raw value, rendered text)`.
pub type CssClassFn = dyn Fn(&Column, Option<&Value>, &str) -> Option<String>;

/// Extra CSS class contributed by a column to each of its cells.
#[derive(Clone)]
pub enum CssClass {
    Static(String),
    Dynamic(Rc<CssClassFn>),
}

impl CssClass {
    /// Resolve the class for one cell. Recomputed on every render.
    pub fn resolve(&self, column: &Column, raw: Option<&Value>, rendered: &str) -> Option<String> {
        match self {
            Self::Static(class) => Some(class.clone()),
            Self::Dynamic(f) => f(column, raw, rendered),
        }
        .filter(|class| !class.trim().is_empty())
    }
}

impl fmt::Debug for CssClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(class) => f.debug_tuple("Static").field(class).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for CssClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Static)
    }
}

/// Column descriptor. Identity is by `field`, falling back to position.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default = "default_width", deserialize_with = "deserialize_width")]
    pub width: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub filter_type: FilterKind,
    #[serde(default, skip_serializing)]
    pub css_class: Option<CssClass>,
    #[serde(skip)]
    pub editor: Option<Rc<dyn CellEditor>>,
}

fn default_width() -> u32 {
    DEFAULT_COLUMN_WIDTH
}

fn default_visible() -> bool {
    true
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_width<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 {
        return Ok(MIN_COLUMN_WIDTH);
    }
    Ok(clamp_width(raw.round().min(f64::from(u32::MAX)) as u32))
}

/// Clamp a width to the minimum column width.
pub fn clamp_width(width: u32) -> u32 {
    width.max(MIN_COLUMN_WIDTH)
}

impl Column {
    /// A visible text column with defaults, addressed by `field`.
    pub fn new(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            field: Some(field.into()),
            name: name.into(),
            column_type: ColumnType::Text,
            format: None,
            width: DEFAULT_COLUMN_WIDTH,
            visible: true,
            filter_type: FilterKind::List,
            css_class: None,
            editor: None,
        }
    }

    /// A visible text column addressed by position only.
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            field: None,
            ..Self::new("", name)
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = clamp_width(width);
        self
    }

    pub fn with_filter(mut self, filter_type: FilterKind) -> Self {
        self.filter_type = filter_type;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_css_class(mut self, css_class: CssClass) -> Self {
        self.css_class = Some(css_class);
        self
    }

    pub fn with_editor(mut self, editor: Rc<dyn CellEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    /// Key used to read this column's value out of a row (`field || index`).
    pub fn key(&self, index: usize) -> FieldKey {
        match self.field.as_deref() {
            Some(field) if !field.is_empty() => FieldKey::Name(field.to_string()),
            _ => FieldKey::Index(index),
        }
    }

    /// Identifier used by the settings store (`id || field || name`).
    pub fn settings_id(&self) -> Option<&str> {
        [self.id.as_deref(), self.field.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
    }

    pub fn has_editor(&self) -> bool {
        self.editor.is_some()
    }

    /// The pattern to hand to the date formatter, if the column overrides it.
    pub fn date_pattern(&self) -> Option<&str> {
        self.format
            .as_deref()
            .filter(|format| *format != crate::numfmt::FORMAT_DEFAULT_DECIMAL)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("field", &self.field)
            .field("name", &self.name)
            .field("column_type", &self.column_type)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("visible", &self.visible)
            .field("filter_type", &self.filter_type)
            .field("css_class", &self.css_class)
            .field("editor", &self.editor.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Sum of visible column widths.
pub fn visible_width(columns: &[Column]) -> u32 {
    columns
        .iter()
        .filter(|c| c.visible)
        .map(|c| c.width)
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_applies_defaults() {
        let column: Column = serde_json::from_str(r#"{"field": "a", "name": "A"}"#).unwrap();
        assert_eq!(column.width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(column.filter_type, FilterKind::List);
        assert_eq!(column.column_type, ColumnType::Text);
        assert!(column.visible);
    }

    #[test]
    fn test_width_is_clamped() {
        let column: Column = serde_json::from_str(r#"{"name": "A", "width": 12.4}"#).unwrap();
        assert_eq!(column.width, MIN_COLUMN_WIDTH);
        assert_eq!(Column::new("a", "A").with_width(10).width, MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let column: Column =
            serde_json::from_str(r#"{"name": "A", "type": "money", "filterType": "odd"}"#).unwrap();
        assert_eq!(column.column_type, ColumnType::Text);
        assert_eq!(column.filter_type, FilterKind::None);
    }

    #[test]
    fn test_key_falls_back_to_index() {
        assert_eq!(Column::positional("A").key(3), FieldKey::Index(3));
        assert_eq!(Column::new("a", "A").key(3), FieldKey::Name("a".into()));
    }

    #[test]
    fn test_settings_id_order() {
        let mut column = Column::new("field", "Name");
        assert_eq!(column.settings_id(), Some("field"));
        column.id = Some("id".into());
        assert_eq!(column.settings_id(), Some("id"));
        assert_eq!(Column::positional("Name").settings_id(), Some("Name"));
    }
}
