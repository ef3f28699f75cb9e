//! Data types for the grid: rows, columns, filters, selection, options.

mod column;
mod events;
mod filter;
mod options;
mod selection;
mod value;

pub use column::*;
pub use events::*;
pub use filter::*;
pub use options::*;
pub use selection::*;
pub use value::*;
