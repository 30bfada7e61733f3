//! The `.bspec` archive container format.
//!
//! An archive is a single file holding a manifest, documents and assets as
//! zstd-compressed, CRC-checked entries, sealed with a BLAKE3 checksum.
//!
//! # Layout
//!
//! ```text
//! header:  "BSPC" | format version (u32 BE) | entry count (u32 BE)
//! entry:   type byte | varint name len | name | [asset: 32-byte content id]
//!          | varint raw size | varint compressed size | CRC32 (u32 BE) | zstd data
//! trailer: BLAKE3 of all preceding bytes (32 bytes)
//! ```
//!
//! The manifest is always the first entry. Documents keep the order they were
//! written in, which is how an archive preserves document insertion order.
//!
//! - **ArchiveWriter**: encodes an archive in memory, then writes it atomically
//! - **ArchiveReader**: verifies and decodes an archive

pub mod entry;
pub mod error;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use entry::{ArchiveEntry, EntryKind};
pub use error::{PackError, PackResult};
pub use manifest::ArchiveManifest;
pub use reader::ArchiveReader;
pub use writer::{ArchiveFile, ArchiveWriter, DEFAULT_COMPRESSION_LEVEL};

/// Magic bytes at the start of every archive.
pub const MAGIC: &[u8; 4] = b"BSPC";

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

/// Magic + version + entry count.
pub(crate) const HEADER_LEN: usize = 12;

/// Largest uncompressed entry a reader will allocate for: 1 GiB.
pub const MAX_ENTRY_SIZE: u64 = 1 << 30;
