use std::fmt;

use bspec_query::QueryError;
use bspec_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validator::ValidationReport;

/// Stable numeric error taxonomy shared with every binding of the archive
/// format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    InvalidPath = 1,
    FileNotFound = 2,
    InvalidArchive = 3,
    InvalidQuery = 4,
    SerializationError = 5,
    ValidationError = 6,
    UnknownError = 99,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a numeric code back to its variant. Unknown numbers map to
    /// [`ErrorCode::UnknownError`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::InvalidPath,
            2 => Self::FileNotFound,
            3 => Self::InvalidArchive,
            4 => Self::InvalidQuery,
            5 => Self::SerializationError,
            6 => Self::ValidationError,
            _ => Self::UnknownError,
        }
    }

    /// Fixed human-readable description.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidPath => "Invalid path",
            Self::FileNotFound => "File not found",
            Self::InvalidArchive => "Invalid archive format",
            Self::InvalidQuery => "Invalid query",
            Self::SerializationError => "Serialization error",
            Self::ValidationError => "Validation error",
            Self::UnknownError => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Look up the message for a numeric error code.
pub fn error_message(code: i32) -> &'static str {
    ErrorCode::from_code(code).message()
}

#[derive(Debug, Error)]
pub enum BSpecError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("invalid query: {0}")]
    InvalidQuery(QueryError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("document failed validation: {0}")]
    Validation(ValidationReport),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("index {index} out of range for result of {count} documents")]
    IndexOutOfRange { index: usize, count: usize },
}

impl BSpecError {
    /// The stable taxonomy member for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPath(_) => ErrorCode::InvalidPath,
            Self::FileNotFound(_) | Self::DocumentNotFound(_) | Self::AssetNotFound(_) => {
                ErrorCode::FileNotFound
            }
            Self::InvalidArchive(_) => ErrorCode::InvalidArchive,
            Self::InvalidQuery(_) => ErrorCode::InvalidQuery,
            Self::Serialization(_) => ErrorCode::SerializationError,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::IndexOutOfRange { .. } => ErrorCode::UnknownError,
        }
    }
}

impl From<QueryError> for BSpecError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::MalformedJson(msg) => Self::Serialization(msg),
            other => Self::InvalidQuery(other),
        }
    }
}

impl From<StoreError> for BSpecError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound(id) => Self::DocumentNotFound(id),
            StoreError::HashMismatch { .. } | StoreError::DuplicateDocument(_) => {
                Self::InvalidArchive(err.to_string())
            }
            StoreError::MalformedDocument(_)
            | StoreError::AssetTooLarge { .. }
            | StoreError::Serialization(_) => Self::Serialization(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BSpecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type BSpecResult<T> = Result<T, BSpecError>;
