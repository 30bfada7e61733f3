use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conformance::ConformanceLevel;

/// Summary counters for an archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub name: String,
    pub format_version: u32,
    pub document_count: u64,
    pub asset_count: u64,
    /// Compact JSON size of all documents.
    pub document_bytes: u64,
    /// Raw size of all asset payloads.
    pub asset_bytes: u64,
    /// `document_bytes + asset_bytes`.
    pub size: u64,
    /// Distinct `"type"` values across documents, sorted.
    pub document_types: Vec<String>,
    /// Documents per `"type"` value.
    pub by_type: BTreeMap<String, u64>,
    /// Documents per `"status"` value.
    pub by_status: BTreeMap<String, u64>,
    /// Documents per `"domain"` value.
    pub by_domain: BTreeMap<String, u64>,
    /// Highest conformance level the document count reaches.
    pub conformance_level: Option<ConformanceLevel>,
}
