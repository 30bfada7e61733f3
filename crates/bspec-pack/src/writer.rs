use std::io::Write;
use std::path::{Path, PathBuf};

use bspec_types::ObjectId;

use crate::entry::EntryKind;
use crate::error::{PackError, PackResult};
use crate::manifest::ArchiveManifest;
use crate::{FORMAT_VERSION, HEADER_LEN, MAGIC};

/// Default zstd compression level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Result of writing an archive to disk.
#[derive(Clone, Debug)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub entry_count: u32,
    pub bytes_written: u64,
    pub checksum: [u8; 32],
}

/// Encodes a `.bspec` archive.
///
/// The manifest is written as the first entry on construction; documents and
/// assets follow in the order they are added.
pub struct ArchiveWriter {
    buf: Vec<u8>,
    entry_count: u32,
    compression_level: i32,
}

impl ArchiveWriter {
    /// Start a new archive with the given manifest.
    pub fn new(manifest: &ArchiveManifest, compression_level: i32) -> PackResult<Self> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        // Entry count, patched in `finish`.
        buf.extend_from_slice(&0u32.to_be_bytes());
        debug_assert_eq!(buf.len(), HEADER_LEN);

        let mut writer = Self {
            buf,
            entry_count: 0,
            compression_level,
        };
        let manifest_bytes = manifest.to_bytes()?;
        writer.push_entry(EntryKind::Manifest, "", None, &manifest_bytes)?;
        Ok(writer)
    }

    /// Append a document entry holding its JSON bytes.
    pub fn add_document(&mut self, id: &str, json: &[u8]) -> PackResult<()> {
        self.push_entry(EntryKind::Document, id, None, json)
    }

    /// Append an asset entry with its content id.
    pub fn add_asset(&mut self, path: &str, content_id: &ObjectId, data: &[u8]) -> PackResult<()> {
        self.push_entry(EntryKind::Asset, path, Some(content_id), data)
    }

    /// Finish the archive and return its bytes (no disk I/O).
    pub fn finish_to_bytes(mut self) -> PackResult<Vec<u8>> {
        self.seal();
        Ok(self.buf)
    }

    /// Finish the archive and write it to `path` atomically.
    ///
    /// Bytes go to a temporary file in the destination directory, which is
    /// synced and then renamed over `path`. On error the destination is left
    /// untouched.
    pub fn finish(mut self, path: &Path) -> PackResult<ArchiveFile> {
        let checksum = self.seal();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".bspec-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(&self.buf)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| PackError::Io(e.error))?;

        tracing::debug!(
            path = %path.display(),
            entries = self.entry_count,
            bytes = self.buf.len(),
            "archive written"
        );

        Ok(ArchiveFile {
            path: path.to_path_buf(),
            entry_count: self.entry_count,
            bytes_written: self.buf.len() as u64,
            checksum,
        })
    }

    fn push_entry(
        &mut self,
        kind: EntryKind,
        name: &str,
        content_id: Option<&ObjectId>,
        data: &[u8],
    ) -> PackResult<()> {
        let compressed = zstd::encode_all(data, self.compression_level)
            .map_err(|e| PackError::CompressionFailed(e.to_string()))?;

        self.buf.push(kind.type_byte());
        encode_varint(&mut self.buf, name.len() as u64);
        self.buf.extend_from_slice(name.as_bytes());
        if kind == EntryKind::Asset {
            let id = content_id.ok_or_else(|| {
                PackError::Serialization(format!("asset {name:?} has no content id"))
            })?;
            self.buf.extend_from_slice(id.as_bytes());
        }
        encode_varint(&mut self.buf, data.len() as u64);
        encode_varint(&mut self.buf, compressed.len() as u64);
        self.buf
            .extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
        self.buf.extend_from_slice(&compressed);

        self.entry_count += 1;
        Ok(())
    }

    /// Patch the entry count and append the BLAKE3 trailer.
    fn seal(&mut self) -> [u8; 32] {
        self.buf[8..12].copy_from_slice(&self.entry_count.to_be_bytes());
        let checksum = *blake3::hash(&self.buf).as_bytes();
        self.buf.extend_from_slice(&checksum);
        checksum
    }
}

/// Encode a u64 as a variable-length integer.
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer. Returns (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8]) -> PackResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        if shift >= 64 {
            return Err(PackError::CorruptEntry {
                offset: 0,
                reason: "varint overflow".into(),
            });
        }
    }
    Err(PackError::CorruptEntry {
        offset: 0,
        reason: "truncated varint".into(),
    })
}
