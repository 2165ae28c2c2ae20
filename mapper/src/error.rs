//! Assertion error types.

use rowcheck_codec::CodecError;
use rowcheck_core::ErrorKind;
use rowcheck_storage::{Operation, StorageError};
use thiserror::Error;

/// Errors raised while mapping or asserting a table.
#[derive(Debug, Error)]
pub enum AssertError {
    /// A cell in a data row cannot be decoded.
    #[error("failed to decode table row {row}: {source}")]
    InvalidFormat {
        row: usize,
        #[source]
        source: CodecError,
    },

    /// A bound variable cannot be turned back into cell text.
    #[error("failed to encode variable {token}: {source}")]
    Variable {
        token: String,
        #[source]
        source: CodecError,
    },

    /// Exhaustive assertion count disagreement.
    #[error("invalid number of rows in table {table}: {expected} expected, {found} found")]
    RowCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// No stored row matched the filter built for an expected row.
    #[error("row {row} not found in table {table} with {filter}: expected {expected}")]
    RowNotFound {
        table: String,
        row: usize,
        filter: String,
        expected: String,
    },

    /// Deferred column compared unequal.
    #[error("unexpected row contents at column {column} of row {row}: expected {expected}, found {actual}")]
    ValueMismatch {
        row: usize,
        column: String,
        expected: String,
        actual: String,
    },

    /// Storage adapter failure, with what was being attempted.
    #[error("failed to {operation} table {table} ({context}): {source}")]
    Adapter {
        operation: Operation,
        table: String,
        context: String,
        #[source]
        source: StorageError,
    },

    /// Failure enriched with the rendered live table contents.
    #[error("{error}, rows available:\n{snapshot}")]
    WithSnapshot {
        #[source]
        error: Box<AssertError>,
        snapshot: String,
    },

    /// Failure whose snapshot could not be rendered.
    #[error("{error}, failed to query existing rows: {snapshot_error}")]
    SnapshotFailed {
        #[source]
        error: Box<AssertError>,
        snapshot_error: Box<AssertError>,
    },
}

impl AssertError {
    pub fn invalid_format(row: usize, source: CodecError) -> Self {
        Self::InvalidFormat { row, source }
    }

    pub fn row_count_mismatch(table: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::RowCountMismatch {
            table: table.into(),
            expected,
            found,
        }
    }

    pub fn adapter(
        operation: Operation,
        table: impl Into<String>,
        context: impl Into<String>,
        source: StorageError,
    ) -> Self {
        Self::Adapter {
            operation,
            table: table.into(),
            context: context.into(),
            source,
        }
    }

    /// The underlying failure, looking through snapshot wrappers.
    pub fn root(&self) -> &AssertError {
        match self {
            AssertError::WithSnapshot { error, .. } | AssertError::SnapshotFailed { error, .. } => {
                error.root()
            }
            other => other,
        }
    }

    /// Category of the underlying failure.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            AssertError::InvalidFormat { .. } | AssertError::Variable { .. } => {
                ErrorKind::InvalidFormat
            }
            AssertError::RowCountMismatch { .. } => ErrorKind::RowCountMismatch,
            AssertError::RowNotFound { .. } => ErrorKind::RowNotFound,
            AssertError::ValueMismatch { .. } => ErrorKind::ValueMismatch,
            AssertError::Adapter { .. }
            | AssertError::WithSnapshot { .. }
            | AssertError::SnapshotFailed { .. } => ErrorKind::AdapterFailure,
        }
    }

    /// Rendered snapshot attached to this error, if any.
    pub fn snapshot(&self) -> Option<&str> {
        match self {
            AssertError::WithSnapshot { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Result type for mapper operations.
pub type AssertResult<T> = Result<T, AssertError>;
