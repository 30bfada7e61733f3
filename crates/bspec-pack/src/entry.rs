use bspec_types::ObjectId;

/// Type tag for archive entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Archive-level metadata, always the first entry.
    Manifest,
    /// A JSON document keyed by its identifier.
    Document,
    /// A binary payload keyed by its archive-relative path.
    Asset,
}

impl EntryKind {
    /// Serialize to a type byte for the archive format.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Manifest => 1,
            Self::Document => 2,
            Self::Asset => 3,
        }
    }

    /// Parse from a type byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Manifest),
            2 => Some(Self::Document),
            3 => Some(Self::Asset),
            _ => None,
        }
    }
}

/// A single decoded entry of a `.bspec` archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub kind: EntryKind,
    /// Document id, asset path, or empty for the manifest.
    pub name: String,
    /// Content id recorded for asset entries.
    pub content_id: Option<ObjectId>,
    /// Uncompressed payload.
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bytes_are_stable() {
        assert_eq!(EntryKind::Manifest.type_byte(), 1);
        assert_eq!(EntryKind::Document.type_byte(), 2);
        assert_eq!(EntryKind::Asset.type_byte(), 3);
    }

    #[test]
    fn from_type_byte_known() {
        for kind in [EntryKind::Manifest, EntryKind::Document, EntryKind::Asset] {
            assert_eq!(EntryKind::from_type_byte(kind.type_byte()), Some(kind));
        }
    }

    #[test]
    fn from_type_byte_unknown() {
        assert!(EntryKind::from_type_byte(0).is_none());
        assert!(EntryKind::from_type_byte(4).is_none());
        assert!(EntryKind::from_type_byte(255).is_none());
    }
}
