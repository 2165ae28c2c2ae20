//! Common error types for rowcheck.

use thiserror::Error;

/// Errors raised while building a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Table has no header row.
    #[error("table has no header row")]
    MissingHeader,

    /// A data row's cell count differs from the header.
    #[error("row {row} has {actual} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A line is not a `|`-delimited row.
    #[error("malformed table line: {line}")]
    MalformedLine { line: String },
}

impl TableError {
    pub fn ragged_row(row: usize, expected: usize, actual: usize) -> Self {
        Self::RaggedRow {
            row,
            expected,
            actual,
        }
    }

    pub fn malformed_line(line: impl Into<String>) -> Self {
        Self::MalformedLine { line: line.into() }
    }
}

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// The failure categories a table step can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Referenced database instance is not registered.
    UnknownDatabase,
    /// Referenced table is not registered for the database.
    UnknownTable,
    /// Table text or a cell cannot be decoded.
    InvalidFormat,
    /// Exhaustive assertion found a different number of rows.
    RowCountMismatch,
    /// No stored row matched an expected row.
    RowNotFound,
    /// A deferred column compared unequal after fetch.
    ValueMismatch,
    /// The storage adapter reported an error.
    AdapterFailure,
}
