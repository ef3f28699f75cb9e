//! dyngrid - virtualized data grid for the web
//!
//! Renders large row sets into the browser DOM via WebAssembly:
//! - Page-based windowing: placeholders for off-screen pages, batched materialization
//! - Sorting, list/search/date-range filters, row check boxes
//! - Keyboard navigation with type-ahead, pluggable cell editors
//! - Persisted column widths and visibility
//!
//! The grid core ([`Grid`]) is independent of the DOM and runs natively; the
//! wasm build adds the `web-sys` backend and the `DynamicTable` entry point.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DynamicTable } from 'dyngrid';
//! await init();
//! const table = new DynamicTable(element, { showCounter: true });
//! table.on('rowSelect', (row, index) => console.log(index, row));
//! table.setData(rows, columns);
//! ```

pub mod dates;
pub mod editor;
pub mod error;
pub mod filter;
pub mod grid;
pub mod layout;
pub mod numfmt;
pub mod render;
pub mod settings;
pub mod sort;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use grid::Grid;
pub use render::{GridBackend, NullBackend};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::DynamicTable;

/// Render `rows` as the static print table, without a live grid.
///
/// # Errors
/// Returns an error if the options do not validate.
pub fn print_html(rows: Vec<Row>, columns: Vec<Column>, options: GridOptions) -> Result<String> {
    let options = GridOptions {
        settings: SettingsMode::None,
        ..options
    };
    let mut grid = Grid::new(NullBackend, options)?;
    grid.set_data(rows, Some(columns), false);
    Ok(grid.print())
}

/// Render JSON rows and column descriptors as the static print table.
///
/// # Errors
/// Returns an error if either argument is not valid JSON for its shape.
#[wasm_bindgen]
pub fn print_json(rows_json: &str, columns_json: &str) -> std::result::Result<String, JsValue> {
    let rows: Vec<Row> =
        serde_json::from_str(rows_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let columns: Vec<Column> =
        serde_json::from_str(columns_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    print_html(rows, columns, GridOptions::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
