use bspec_types::{DocumentId, ObjectId};

/// Errors from document and asset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested document was not found.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// The document body is not a JSON object or has no usable identifier.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A document with the same identifier is already present where
    /// duplicates are not allowed (e.g. while rebuilding from disk).
    #[error("duplicate document id: {0}")]
    DuplicateDocument(DocumentId),

    /// Content hash mismatch (data corruption).
    #[error("hash mismatch for asset {path}: expected {expected}, computed {computed}")]
    HashMismatch {
        path: String,
        expected: ObjectId,
        computed: ObjectId,
    },

    /// The payload exceeds the configured size limit.
    #[error("asset {path} is {size} bytes, limit is {limit}")]
    AssetTooLarge { path: String, size: u64, limit: u64 },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
