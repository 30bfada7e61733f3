//! Document and asset storage for BSpec archives.
//!
//! An archive owns two stores:
//!
//! - [`DocumentStore`]: structured JSON documents keyed by [`DocumentId`],
//!   kept in insertion order. Replacing a document keeps its position.
//! - [`AssetStore`]: binary payloads keyed by [`AssetPath`]. Every payload
//!   carries a domain-separated BLAKE3 [`ObjectId`] so it can be verified
//!   after a load.
//!
//! # Design Rules
//!
//! 1. Document identifiers and asset paths are unique within a store.
//! 2. Stores never validate document schemas; callers gate insertion.
//! 3. Concurrent reads of the asset store are always safe.
//! 4. All failures are returned as [`StoreError`], never swallowed.
//!
//! [`DocumentId`]: bspec_types::DocumentId
//! [`AssetPath`]: bspec_types::AssetPath
//! [`ObjectId`]: bspec_types::ObjectId

pub mod asset;
pub mod document;
pub mod error;
pub mod hasher;
pub mod memory;
pub mod traits;

pub use asset::StoredAsset;
pub use document::{Document, DocumentChange, DocumentStore};
pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryAssetStore;
pub use traits::{AssetChange, AssetStore};
