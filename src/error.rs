//! Error types for snapshot persistence

use thiserror::Error;

/// Errors surfaced by [`save`](crate::ValueTable::save) and
/// [`load`](crate::ValueTable::load)
///
/// Configuration mistakes (an empty action set, hyperparameters outside their
/// intervals) are fatal and panic at construction instead of appearing here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to write csv export: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
