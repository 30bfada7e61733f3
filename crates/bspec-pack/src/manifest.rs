use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PackError, PackResult};
use crate::FORMAT_VERSION;

/// Archive-level metadata stored as the first entry of every archive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Container format version the archive was written with.
    pub format_version: u32,
    /// Version of the library that wrote the archive.
    pub sdk_version: String,
    /// Archive name/title.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Documents recorded at the last save.
    #[serde(default)]
    pub document_count: u64,
    /// Assets recorded at the last save.
    #[serde(default)]
    pub asset_count: u64,
    /// Distinct document `"type"` values at the last save, sorted.
    #[serde(default)]
    pub document_types: Vec<String>,
    /// Distinct document `"domain"` values at the last save, sorted.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ArchiveManifest {
    /// A fresh manifest for a new archive.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            format_version: FORMAT_VERSION,
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.into(),
            description: String::new(),
            author: String::new(),
            created_at: now,
            updated_at: now,
            document_count: 0,
            asset_count: 0,
            document_types: Vec::new(),
            domains: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Mark the manifest as updated now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_bytes(&self) -> PackResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| PackError::Serialization(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> PackResult<Self> {
        serde_json::from_slice(data).map_err(|e| PackError::Serialization(e.to_string()))
    }
}
