//! Session error types.

use rowcheck_core::{ErrorKind, TableError};
use rowcheck_mapper::AssertError;
use rowcheck_storage::{Operation, StorageError};
use std::path::PathBuf;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Database instance not registered.
    #[error("unknown database {database}")]
    UnknownDatabase { database: String },

    /// Table not registered for the database.
    #[error("unknown table {table} in database {database}")]
    UnknownTable { table: String, database: String },

    /// File-backed table source without a path.
    #[error("missing file name")]
    MissingFileName,

    /// The file could not be opened or is not valid CSV.
    #[error("failed to load rows from file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Table text is malformed.
    #[error("invalid table: {0}")]
    Table(#[from] TableError),

    /// Decode or assertion failure.
    #[error(transparent)]
    Assert(#[from] AssertError),

    /// Storage adapter failure while clearing or populating a table.
    #[error("failed to {operation} table {table} in db {database}: {source}")]
    Adapter {
        operation: Operation,
        table: String,
        database: String,
        #[source]
        source: StorageError,
    },

    /// A post-cleanup statement failed.
    #[error("failed to execute post cleanup statement {statement:?} for table {table} in db {database}: {source}")]
    Cleanup {
        statement: String,
        table: String,
        database: String,
        #[source]
        source: StorageError,
    },

    /// Configuration text is not valid.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SessionError {
    pub fn unknown_database(database: impl Into<String>) -> Self {
        Self::UnknownDatabase {
            database: database.into(),
        }
    }

    pub fn unknown_table(table: impl Into<String>, database: impl Into<String>) -> Self {
        Self::UnknownTable {
            table: table.into(),
            database: database.into(),
        }
    }

    pub fn read_file(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn adapter(
        operation: Operation,
        table: impl Into<String>,
        database: impl Into<String>,
        source: StorageError,
    ) -> Self {
        Self::Adapter {
            operation,
            table: table.into(),
            database: database.into(),
            source,
        }
    }

    /// Failure category, looking through assertion snapshots.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::UnknownDatabase { .. } => ErrorKind::UnknownDatabase,
            SessionError::UnknownTable { .. } => ErrorKind::UnknownTable,
            SessionError::MissingFileName
            | SessionError::ReadFile { .. }
            | SessionError::Table(_)
            | SessionError::Config(_) => ErrorKind::InvalidFormat,
            SessionError::Assert(err) => err.kind(),
            SessionError::Adapter { .. } | SessionError::Cleanup { .. } => {
                ErrorKind::AdapterFailure
            }
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
