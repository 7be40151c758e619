//! Error types for statistics.

use sheetsync_sheet::SheetError;
use thiserror::Error;

/// Result type for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors raised while extracting or summarising numeric columns.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A requested statistics column is not in the table header.
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A statistics column holds a value that is neither numeric nor missing.
    /// `row` is the 1-based sheet row, header included.
    #[error("Non-numeric value {value:?} in column {column} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// The table has no header to name columns by.
    #[error("Table has no header row")]
    NoHeader,

    /// Underlying sheet access error.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}
