//! Foundation types for BSpec archives.
//!
//! This crate provides the identity and addressing types shared by every
//! other `bspec-*` crate.
//!
//! # Key Types
//!
//! - [`ObjectId`]: content-addressed identifier (BLAKE3 hash)
//! - [`DocumentId`]: validated, non-empty document identifier
//! - [`AssetPath`]: validated archive-relative asset path

pub mod asset;
pub mod document;
pub mod error;
pub mod object;

pub use asset::{AssetPath, MAX_ASSET_PATH_LEN};
pub use document::DocumentId;
pub use error::TypeError;
pub use object::ObjectId;
