use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("invalid asset path {path:?}: {reason}")]
    InvalidAssetPath { path: String, reason: String },
}
