//! Storage error types.

use crate::Operation;
use thiserror::Error;

/// Errors reported by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend reported a failure.
    #[error("{operation} on table {table} failed: {message}")]
    Backend {
        operation: Operation,
        table: String,
        message: String,
    },

    /// Statement could not be executed.
    #[error("statement {statement:?} failed: {message}")]
    Statement { statement: String, message: String },

    /// Any other adapter-specific error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn backend(
        operation: Operation,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            operation,
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn statement(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Statement {
            statement: statement.into(),
            message: message.into(),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
