//! Structured error types for dyngrid.
//!
//! Data problems (bad dates, missing editors, out-of-range selection) never end
//! up here: they degrade to empty strings, no-ops or clamped indices. What is
//! left are programmer mistakes and failures of the host environment.

/// All errors that can surface from the grid's public operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A public operation or option was addressed by a name that does not exist.
    #[error("Method {0} does not exist on dyngrid")]
    UnknownOperation(String),

    /// Options failed validation (zero page size, non-positive row height, ...).
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A row index outside the current view was addressed.
    #[error("Row {index} out of range (view has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// The settings storage refused a read or write.
    #[error("Settings storage: {0}")]
    Storage(String),

    /// JSON (de)serialization failure.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A DOM call failed or a required element is missing.
    #[error("DOM: {0}")]
    Dom(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

#[cfg(target_arch = "wasm32")]
impl From<serde_wasm_bindgen::Error> for GridError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::InvalidOptions(e.to_string())
    }
}
