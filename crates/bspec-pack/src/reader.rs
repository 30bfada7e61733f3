use std::path::Path;

use bspec_types::ObjectId;

use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::{PackError, PackResult};
use crate::manifest::ArchiveManifest;
use crate::writer::decode_varint;
use crate::{FORMAT_VERSION, HEADER_LEN, MAGIC, MAX_ENTRY_SIZE};

const TRAILER_LEN: usize = 32;

/// A fully decoded `.bspec` archive.
///
/// Decoding is eager: the header, trailer checksum and every entry's CRC are
/// verified before the reader is returned.
#[derive(Debug)]
pub struct ArchiveReader {
    manifest: ArchiveManifest,
    entries: Vec<ArchiveEntry>,
    checksum: [u8; 32],
}

impl ArchiveReader {
    /// Decode an archive from raw bytes.
    pub fn from_bytes(data: &[u8]) -> PackResult<Self> {
        if data.len() < HEADER_LEN + TRAILER_LEN {
            return Err(PackError::CorruptEntry {
                offset: 0,
                reason: "archive data too short".into(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(PackError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }
        let version = read_u32(data, 4);
        if version != FORMAT_VERSION {
            return Err(PackError::UnsupportedVersion(version));
        }

        let (body, trailer) = data.split_at(data.len() - TRAILER_LEN);
        if blake3::hash(body).as_bytes() != trailer {
            return Err(PackError::ChecksumMismatch);
        }
        let mut checksum = [0u8; 32];
        checksum.copy_from_slice(trailer);

        let entry_count = read_u32(data, 8);
        let mut pos = HEADER_LEN;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            let (entry, next) = read_entry(body, pos)?;
            entries.push(entry);
            pos = next;
        }
        if pos != body.len() {
            return Err(PackError::CorruptEntry {
                offset: pos as u64,
                reason: format!("{} trailing bytes after last entry", body.len() - pos),
            });
        }

        let manifest = match entries.first() {
            Some(first) if first.kind == EntryKind::Manifest => {
                ArchiveManifest::from_bytes(&first.data)?
            }
            _ => return Err(PackError::MissingManifest),
        };
        if manifest.format_version != version {
            return Err(PackError::CorruptEntry {
                offset: HEADER_LEN as u64,
                reason: format!(
                    "manifest declares format version {}, header declares {version}",
                    manifest.format_version
                ),
            });
        }
        entries.remove(0);
        if let Some(extra) = entries.iter().find(|e| e.kind == EntryKind::Manifest) {
            return Err(PackError::CorruptEntry {
                offset: 0,
                reason: format!("unexpected second manifest entry {:?}", extra.name),
            });
        }

        Ok(Self {
            manifest,
            entries,
            checksum,
        })
    }

    /// Read and decode an archive file.
    pub fn open(path: &Path) -> PackResult<Self> {
        let data = std::fs::read(path)?;
        let reader = Self::from_bytes(&data)?;
        tracing::debug!(
            path = %path.display(),
            entries = reader.entries.len(),
            bytes = data.len(),
            "archive decoded"
        );
        Ok(reader)
    }

    pub fn manifest(&self) -> &ArchiveManifest {
        &self.manifest
    }

    /// Document and asset entries in file order (manifest excluded).
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn checksum(&self) -> &[u8; 32] {
        &self.checksum
    }

    /// Document entries in file order.
    pub fn documents(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Document)
    }

    /// Asset entries in file order.
    pub fn assets(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Asset)
    }

    /// Take ownership of the manifest and entries.
    pub fn into_parts(self) -> (ArchiveManifest, Vec<ArchiveEntry>) {
        (self.manifest, self.entries)
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[at..at + 4]);
    u32::from_be_bytes(word)
}

fn slice_at(data: &[u8], pos: usize, len: usize, offset: usize) -> PackResult<&[u8]> {
    pos.checked_add(len)
        .filter(|&end| end <= data.len())
        .map(|end| &data[pos..end])
        .ok_or_else(|| PackError::CorruptEntry {
            offset: offset as u64,
            reason: "entry extends beyond archive".into(),
        })
}

/// Decode one entry starting at `offset`; returns it with the next offset.
fn read_entry(data: &[u8], offset: usize) -> PackResult<(ArchiveEntry, usize)> {
    let corrupt = |reason: String| PackError::CorruptEntry {
        offset: offset as u64,
        reason,
    };
    let take = |pos: usize, len: usize| slice_at(data, pos, len, offset);

    let mut pos = offset;
    let type_byte = take(pos, 1)?[0];
    pos += 1;
    let kind = EntryKind::from_type_byte(type_byte)
        .ok_or_else(|| corrupt(format!("unknown type byte: {type_byte}")))?;

    let (name_len, consumed) =
        decode_varint(&data[pos..]).map_err(|_| corrupt("bad name length".into()))?;
    pos += consumed;
    let name_bytes = take(pos, name_len as usize)?;
    let name = std::str::from_utf8(name_bytes)
        .map_err(|_| corrupt("entry name is not UTF-8".into()))?
        .to_string();
    pos += name_bytes.len();

    let content_id = if kind == EntryKind::Asset {
        let raw = take(pos, 32)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(raw);
        pos += 32;
        Some(ObjectId::from_hash(hash))
    } else {
        None
    };

    let (uncompressed_size, consumed) =
        decode_varint(&data[pos..]).map_err(|_| corrupt("bad uncompressed size".into()))?;
    pos += consumed;
    let (compressed_size, consumed) =
        decode_varint(&data[pos..]).map_err(|_| corrupt("bad compressed size".into()))?;
    pos += consumed;

    let expected_crc = read_u32(take(pos, 4)?, 0);
    pos += 4;
    let compressed = take(pos, compressed_size as usize)?;
    pos += compressed.len();

    if crc32fast::hash(compressed) != expected_crc {
        return Err(PackError::CrcMismatch { name });
    }

    if uncompressed_size > MAX_ENTRY_SIZE {
        return Err(corrupt(format!(
            "declared size {uncompressed_size} exceeds limit {MAX_ENTRY_SIZE}"
        )));
    }
    let decompressed = zstd::bulk::decompress(compressed, uncompressed_size as usize)
        .map_err(|e| corrupt(format!("entry {name:?} does not fit its declared size: {e}")))?;
    if decompressed.len() as u64 != uncompressed_size {
        return Err(corrupt(format!(
            "size mismatch: expected {uncompressed_size}, got {}",
            decompressed.len()
        )));
    }

    Ok((
        ArchiveEntry {
            kind,
            name,
            content_id,
            data: decompressed,
        },
        pos,
    ))
}
