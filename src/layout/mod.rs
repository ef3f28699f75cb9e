//! Layout engine for windowed rendering.
//!
//! This module handles:
//! - Partitioning the current view into pages and tracking which are materialized
//! - Deciding when a scroll burst has settled enough to render
//! - The type-ahead input buffer
//! - Scroll-into-view arithmetic for the selected row

mod pages;
mod scheduler;
mod viewport;

pub use pages::{contiguous_runs, PageMask};
pub use scheduler::{InputBuffer, ScrollScheduler, ScrollState};
pub use viewport::Viewport;
