/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Snapshot persistence for learned tables
pub mod snapshot;

/// The Q-value table
pub mod table;

mod util;

pub use error::{Error, Result};
pub use table::ValueTable;
