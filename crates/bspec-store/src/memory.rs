use std::collections::BTreeMap;
use std::sync::RwLock;

use bspec_types::AssetPath;

use crate::asset::StoredAsset;
use crate::error::{StoreError, StoreResult};
use crate::traits::{AssetChange, AssetStore};

/// In-memory, path-ordered asset store.
///
/// Assets are held behind a `RwLock` for safe concurrent access and cloned on
/// read. A `BTreeMap` keeps paths sorted so archives serialize
/// deterministically.
pub struct InMemoryAssetStore {
    assets: RwLock<BTreeMap<AssetPath, StoredAsset>>,
    max_asset_size: Option<u64>,
}

impl InMemoryAssetStore {
    /// Create a new empty store with no size limit.
    pub fn new() -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
            max_asset_size: None,
        }
    }

    /// Create a store that rejects payloads larger than `limit` bytes.
    pub fn with_size_limit(limit: u64) -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
            max_asset_size: Some(limit),
        }
    }

    /// Number of assets currently stored.
    pub fn len(&self) -> usize {
        self.assets.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all stored assets.
    pub fn total_bytes(&self) -> u64 {
        self.assets
            .read()
            .expect("lock poisoned")
            .values()
            .map(|asset| asset.size)
            .sum()
    }

    /// Visit every asset in path order without cloning payloads.
    ///
    /// The read lock is held for the whole walk; the first error stops it.
    pub fn try_for_each<E>(
        &self,
        mut f: impl FnMut(&AssetPath, &StoredAsset) -> Result<(), E>,
    ) -> Result<(), E> {
        let map = self.assets.read().expect("lock poisoned");
        map.iter().try_for_each(|(path, asset)| f(path, asset))
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore for InMemoryAssetStore {
    fn read(&self, path: &AssetPath) -> StoreResult<Option<StoredAsset>> {
        let map = self.assets.read().expect("lock poisoned");
        Ok(map.get(path).cloned())
    }

    fn write(&self, path: AssetPath, asset: StoredAsset) -> StoreResult<AssetChange> {
        if let Some(limit) = self.max_asset_size {
            if asset.size > limit {
                return Err(StoreError::AssetTooLarge {
                    path: path.to_string(),
                    size: asset.size,
                    limit,
                });
            }
        }
        let mut map = self.assets.write().expect("lock poisoned");
        match map.insert(path, asset) {
            Some(_) => Ok(AssetChange::Overwritten),
            None => Ok(AssetChange::Added),
        }
    }

    fn delete(&self, path: &AssetPath) -> StoreResult<bool> {
        let mut map = self.assets.write().expect("lock poisoned");
        Ok(map.remove(path).is_some())
    }

    fn paths(&self) -> StoreResult<Vec<AssetPath>> {
        let map = self.assets.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }
}

impl std::fmt::Debug for InMemoryAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAssetStore")
            .field("asset_count", &self.len())
            .field("max_asset_size", &self.max_asset_size)
            .finish()
    }
}
