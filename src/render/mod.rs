//! Rendering: virtual nodes, the backend trait and its DOM implementation.
//!
//! This module provides:
//! - Backend-agnostic node types and the [`GridBackend`] trait
//! - Pure builders turning grid state into nodes
//! - The static print table
//! - The `web-sys` DOM backend (wasm32 only)

pub mod backend;
pub mod builder;
pub mod print;

#[cfg(target_arch = "wasm32")]
pub mod dom;

// Re-export commonly used types
pub use backend::{
    CellNode, CellRect, CounterNode, GridBackend, HeaderCellNode, HeaderNode, NullBackend,
    PageBatch, PageNode, PageRun, PlaceholderNode, RowNode, SortIndicator,
};
pub use builder::RenderContext;
pub use print::{html_escape, print_table};

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;
