use bspec_types::AssetPath;

use crate::asset::StoredAsset;
use crate::error::StoreResult;

/// Outcome of writing an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetChange {
    /// No asset existed at the path.
    Added,
    /// An existing asset was overwritten.
    Overwritten,
}

/// Path-addressed asset store.
///
/// All implementations must satisfy these invariants:
/// - Paths are unique; writing to an existing path overwrites it.
/// - Every stored asset's `id` matches its payload.
/// - Concurrent reads are always safe.
/// - The store never interprets payload contents.
pub trait AssetStore: Send + Sync {
    /// Read an asset by path. Returns `Ok(None)` if absent.
    fn read(&self, path: &AssetPath) -> StoreResult<Option<StoredAsset>>;

    /// Insert or overwrite the asset at `path`.
    fn write(&self, path: AssetPath, asset: StoredAsset) -> StoreResult<AssetChange>;

    /// Delete an asset. Returns `true` if it existed.
    fn delete(&self, path: &AssetPath) -> StoreResult<bool>;

    /// All asset paths, sorted.
    fn paths(&self) -> StoreResult<Vec<AssetPath>>;
}
