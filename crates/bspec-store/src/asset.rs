use bspec_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// A binary asset payload plus its cached content id and size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAsset {
    /// Domain-separated BLAKE3 hash of `data`.
    pub id: ObjectId,
    /// Raw payload bytes.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredAsset {
    /// Wrap a payload, computing its content id.
    pub fn new(data: Vec<u8>) -> Self {
        let id = ContentHasher::ASSET.hash(&data);
        let size = data.len() as u64;
        Self { id, data, size }
    }

    /// Rebuild an asset read from storage, checking that `expected` matches
    /// the payload.
    pub fn verified(path: &str, expected: ObjectId, data: Vec<u8>) -> StoreResult<Self> {
        if !ContentHasher::ASSET.verify(&data, &expected) {
            return Err(StoreError::HashMismatch {
                path: path.to_string(),
                expected,
                computed: ContentHasher::ASSET.hash(&data),
            });
        }
        let size = data.len() as u64;
        Ok(Self {
            id: expected,
            data,
            size,
        })
    }
}
