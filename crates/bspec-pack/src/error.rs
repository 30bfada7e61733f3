use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported archive format version: {0}")]
    UnsupportedVersion(u32),

    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    #[error("corrupt archive entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("CRC32 mismatch for entry {name:?}")]
    CrcMismatch { name: String },

    #[error("archive has no manifest entry")]
    MissingManifest,

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type PackResult<T> = Result<T, PackError>;
