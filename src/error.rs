//! Error types for dataset construction and splitting.

use thiserror::Error;

/// Errors raised by the in-memory dataset operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    /// Train proportion is NaN, infinite, or outside `[0, 1]`.
    #[error("invalid proportion: {0} (must be within [0, 1])")]
    InvalidProportion(f64),

    /// A row does not have one value per column.
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        /// 0-based position of the offending row.
        row: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of fields actually present.
        found: usize,
    },
}

/// Result type for dataset operations.
pub type SplitResult<T> = std::result::Result<T, SplitError>;
