//! Harness error types.

use rowcheck_core::TableError;
use rowcheck_session::SessionError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or running feature text.
#[derive(Debug, Error)]
pub enum StepsError {
    /// Feature file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Feature text is malformed.
    #[error("feature parse error at line {line}: {message}")]
    FeatureParse { line: usize, message: String },

    /// A data table in the feature text is malformed.
    #[error("invalid data table at line {line}: {source}")]
    DataTable {
        line: usize,
        #[source]
        source: TableError,
    },

    /// A step phrase pattern failed to compile.
    #[error("invalid step pattern: {0}")]
    Pattern(#[from] regex_lite::Error),

    /// No phrase matches the step text.
    #[error("undefined step: {step}")]
    UndefinedStep { step: String },

    /// The step needs a data table or doc string it did not get.
    #[error("step {step:?} requires a {expected}")]
    MissingArgument { step: String, expected: &'static str },

    /// A table operation failed.
    #[error("scenario {scenario:?}, step {step:?}: {source}")]
    StepFailed {
        scenario: String,
        step: String,
        #[source]
        source: SessionError,
    },
}

impl StepsError {
    pub fn file_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn feature_parse(line: usize, message: impl Into<String>) -> Self {
        Self::FeatureParse {
            line,
            message: message.into(),
        }
    }

    pub fn undefined_step(step: impl Into<String>) -> Self {
        Self::UndefinedStep { step: step.into() }
    }

    pub fn missing_argument(step: impl Into<String>, expected: &'static str) -> Self {
        Self::MissingArgument {
            step: step.into(),
            expected,
        }
    }

    /// The session failure behind a failed step, if any.
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            StepsError::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for harness operations.
pub type StepsResult<T> = Result<T, StepsError>;
