//! Codec error types.

use thiserror::Error;

/// Errors that can occur while converting cells.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Cell text cannot be decoded into the column's type.
    #[error("invalid format for column {column}: {raw:?} ({reason})")]
    InvalidFormat {
        column: String,
        raw: String,
        reason: String,
    },

    /// Header names a column the row type does not declare.
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    /// A value cannot be encoded as cell text.
    #[error("failed to encode {type_name} value: {reason}")]
    Encode { type_name: String, reason: String },
}

impl CodecError {
    pub fn invalid_format(
        column: impl Into<String>,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            column: column.into(),
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    pub fn encode(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
