use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use bspec_pack::{ArchiveManifest, ArchiveReader, ArchiveWriter, EntryKind, PackError};
use bspec_query::Query;
use bspec_store::{
    AssetChange, AssetStore, Document, DocumentChange, DocumentStore, InMemoryAssetStore,
    StoredAsset,
};
use bspec_types::AssetPath;
use serde_json::Value;

use crate::config::ArchiveConfig;
use crate::conformance::ConformanceLevel;
use crate::error::{BSpecError, BSpecResult};
use crate::relations::check_relationships;
use crate::result::QueryResult;
use crate::stats::ArchiveStats;
use crate::validator::{ValidationReport, Validator};

/// An open `.bspec` archive.
///
/// All state lives in memory: mutations never touch disk until [`save`]
/// is called. Documents keep insertion order; assets are kept sorted by
/// path.
///
/// [`save`]: Archive::save
#[derive(Debug)]
pub struct Archive {
    manifest: ArchiveManifest,
    documents: DocumentStore,
    assets: InMemoryAssetStore,
    validator: Validator,
    config: ArchiveConfig,
}

impl Archive {
    /// Create an empty archive with default configuration.
    pub fn create(name: &str) -> Self {
        Self::create_with_config(name, ArchiveConfig::default())
    }

    pub fn create_with_config(name: &str, config: ArchiveConfig) -> Self {
        tracing::info!(name, "archive created");
        Self::empty(ArchiveManifest::new(name), config)
    }

    fn empty(manifest: ArchiveManifest, config: ArchiveConfig) -> Self {
        Self {
            manifest,
            documents: DocumentStore::new(),
            assets: InMemoryAssetStore::with_size_limit(config.max_asset_size),
            validator: Validator::new(config.validation.clone()),
            config,
        }
    }

    /// Open an archive file with default configuration.
    pub fn open(path: impl AsRef<Path>) -> BSpecResult<Self> {
        Self::open_with_config(path, ArchiveConfig::default())
    }

    /// Open an archive file.
    ///
    /// Every entry is verified: container checksums, document schemas under
    /// the configured validator, unique ids and paths, and asset content ids.
    pub fn open_with_config(path: impl AsRef<Path>, config: ArchiveConfig) -> BSpecResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(BSpecError::InvalidPath("empty archive path".into()));
        }
        if path.is_dir() {
            return Err(BSpecError::InvalidPath(format!(
                "{} is a directory",
                path.display()
            )));
        }

        let reader = ArchiveReader::open(path).map_err(|e| match e {
            PackError::Io(err) => io_error(path, err),
            other => corrupt(path, other.to_string()),
        })?;
        let (manifest, entries) = reader.into_parts();
        let mut archive = Self::empty(manifest, config);

        for entry in entries {
            match entry.kind {
                EntryKind::Document => archive.load_document(&entry.name, &entry.data, path)?,
                EntryKind::Asset => {
                    let content_id = entry.content_id.ok_or_else(|| {
                        corrupt(path, format!("asset {:?} has no content id", entry.name))
                    })?;
                    archive.load_asset(&entry.name, content_id, entry.data, path)?;
                }
                EntryKind::Manifest => {
                    return Err(corrupt(path, "unexpected manifest entry".into()));
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            name = %archive.manifest.name,
            documents = archive.documents.len(),
            assets = archive.assets.len(),
            "archive opened"
        );
        Ok(archive)
    }

    fn load_document(&mut self, name: &str, data: &[u8], path: &Path) -> BSpecResult<()> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| corrupt(path, format!("document {name:?}: {e}")))?;
        let report = self.validator.validate_value(&value);
        if !report.is_valid() {
            return Err(corrupt(path, format!("document {name:?} is invalid: {report}")));
        }
        let document = Document::from_value(value)
            .map_err(|e| corrupt(path, format!("document {name:?}: {e}")))?;
        if document.id().as_str() != name {
            return Err(corrupt(
                path,
                format!("entry {name:?} holds document {:?}", document.id().as_str()),
            ));
        }
        self.documents
            .insert_new(document)
            .map_err(|e| corrupt(path, e.to_string()))
    }

    fn load_asset(
        &mut self,
        name: &str,
        content_id: bspec_types::ObjectId,
        data: Vec<u8>,
        path: &Path,
    ) -> BSpecResult<()> {
        let asset_path = AssetPath::new(name).map_err(|e| corrupt(path, e.to_string()))?;
        let asset = StoredAsset::verified(name, content_id, data)
            .map_err(|e| corrupt(path, e.to_string()))?;
        match self.assets.write(asset_path, asset) {
            Ok(AssetChange::Added) => Ok(()),
            Ok(AssetChange::Overwritten) => {
                Err(corrupt(path, format!("duplicate asset path {name:?}")))
            }
            Err(e) => Err(corrupt(path, e.to_string())),
        }
    }

    /// Write the archive to `path` atomically.
    ///
    /// The manifest's counts, document types, domains and `updated_at` are
    /// refreshed.
    /// Any failure is reported as a serialization error and leaves both the
    /// destination file and this archive's manifest unchanged.
    pub fn save(&mut self, path: impl AsRef<Path>) -> BSpecResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(BSpecError::Serialization("empty archive path".into()));
        }

        let mut manifest = self.manifest.clone();
        manifest.touch();
        manifest.document_count = self.documents.len() as u64;
        manifest.asset_count = self.assets.len() as u64;
        manifest.document_types = self.count_by("type").into_keys().collect();
        manifest.domains = self.count_by("domain").into_keys().collect();

        let mut writer =
            ArchiveWriter::new(&manifest, self.config.compression_level).map_err(save_error)?;
        for document in &self.documents {
            writer
                .add_document(document.id().as_str(), &document.to_vec()?)
                .map_err(save_error)?;
        }
        self.assets
            .try_for_each(|asset_path, asset| {
                writer.add_asset(asset_path.as_str(), &asset.id, &asset.data)
            })
            .map_err(save_error)?;
        let file = writer.finish(path).map_err(save_error)?;

        self.manifest = manifest;
        tracing::info!(
            path = %path.display(),
            entries = file.entry_count,
            bytes = file.bytes_written,
            "archive saved"
        );
        Ok(())
    }

    /// Release the archive. Unsaved changes are discarded.
    pub fn close(self) {
        tracing::debug!(name = %self.manifest.name, "archive closed");
    }

    // ---- Manifest ----

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &ArchiveManifest {
        &self.manifest
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.manifest.description = description.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.manifest.author = author.into();
    }

    /// Set a free-form manifest metadata entry, returning the previous value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.manifest.metadata.insert(key.into(), value)
    }

    // ---- Documents ----

    /// Validate and insert a JSON document, replacing any document with the
    /// same id in place.
    pub fn add_document(&mut self, json: &str) -> BSpecResult<DocumentChange> {
        let document = self.validator.validate_json(json)?;
        let id = document.id().clone();
        let change = self.documents.upsert(document);
        tracing::debug!(id = %id, ?change, "document stored");
        Ok(change)
    }

    /// Remove a document and return it.
    pub fn remove_document(&mut self, id: &str) -> BSpecResult<Document> {
        let removed = self.documents.remove(id)?;
        tracing::debug!(id, "document removed");
        Ok(removed)
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    // ---- Assets ----

    /// Store a binary asset, overwriting any asset at the same path.
    pub fn add_asset(&mut self, path: &str, data: impl Into<Vec<u8>>) -> BSpecResult<AssetChange> {
        let asset_path = parse_asset_path(path)?;
        let asset = StoredAsset::new(data.into());
        let size = asset.size;
        let change = self.assets.write(asset_path, asset)?;
        tracing::debug!(path, size, ?change, "asset stored");
        Ok(change)
    }

    pub fn remove_asset(&mut self, path: &str) -> BSpecResult<()> {
        let asset_path = parse_asset_path(path)?;
        if !self.assets.delete(&asset_path)? {
            return Err(BSpecError::AssetNotFound(path.to_string()));
        }
        tracing::debug!(path, "asset removed");
        Ok(())
    }

    /// Read an asset's payload.
    pub fn asset(&self, path: &str) -> BSpecResult<Vec<u8>> {
        let asset_path = parse_asset_path(path)?;
        self.assets
            .read(&asset_path)?
            .map(|asset| asset.data)
            .ok_or_else(|| BSpecError::AssetNotFound(path.to_string()))
    }

    /// Asset paths in sorted order.
    pub fn asset_paths(&self) -> BSpecResult<Vec<String>> {
        Ok(self.assets.paths()?.into_iter().map(String::from).collect())
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // ---- Queries ----

    /// Parse and run a JSON query.
    pub fn query(&self, json: &str) -> BSpecResult<QueryResult<'_>> {
        let query: Query = json.parse()?;
        Ok(self.run_query(&query))
    }

    /// Run an already-parsed query.
    pub fn run_query(&self, query: &Query) -> QueryResult<'_> {
        let matches = query.execute(&self.documents, Document::body);
        tracing::debug!(
            matched = matches.total,
            returned = matches.items.len(),
            "query evaluated"
        );
        QueryResult::new(matches)
    }

    // ---- Collection checks ----

    /// Check `depends_on`/`enables` references across all documents.
    ///
    /// Returns one report per document with findings, in insertion order; an
    /// empty vector means the collection is consistent.
    pub fn validate_collection(&self) -> Vec<ValidationReport> {
        let reports = check_relationships(&self.documents);
        tracing::debug!(
            documents = self.documents.len(),
            flagged = reports.len(),
            "collection validated"
        );
        reports
    }

    /// Whether the archive holds enough documents for `level`.
    pub fn check_conformance(&self, level: ConformanceLevel) -> bool {
        self.documents.len() >= level.min_documents()
    }

    // ---- Stats ----

    pub fn stats(&self) -> ArchiveStats {
        let document_bytes = self
            .documents
            .iter()
            .map(|d| d.to_vec().map_or(0, |bytes| bytes.len() as u64))
            .sum();
        let asset_bytes = self.assets.total_bytes();
        let by_type = self.count_by("type");
        ArchiveStats {
            name: self.manifest.name.clone(),
            format_version: self.manifest.format_version,
            document_count: self.documents.len() as u64,
            asset_count: self.assets.len() as u64,
            document_bytes,
            asset_bytes,
            size: document_bytes + asset_bytes,
            document_types: by_type.keys().cloned().collect(),
            by_type,
            by_status: self.count_by("status"),
            by_domain: self.count_by("domain"),
            conformance_level: ConformanceLevel::achieved(self.documents.len()),
        }
    }

    pub fn stats_json(&self) -> BSpecResult<String> {
        Ok(serde_json::to_string(&self.stats())?)
    }

    /// Documents per string value of a top-level member, sorted by value.
    fn count_by(&self, field: &str) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for value in self
            .documents
            .iter()
            .filter_map(|d| d.field(field).and_then(Value::as_str))
        {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

fn parse_asset_path(path: &str) -> BSpecResult<AssetPath> {
    AssetPath::new(path).map_err(|e| BSpecError::InvalidPath(e.to_string()))
}

/// Map a filesystem error on `path` onto the taxonomy.
pub(crate) fn io_error(path: &Path, err: io::Error) -> BSpecError {
    match err.kind() {
        io::ErrorKind::NotFound => BSpecError::FileNotFound(path.display().to_string()),
        _ => BSpecError::InvalidPath(format!("{}: {err}", path.display())),
    }
}

fn corrupt(path: &Path, reason: String) -> BSpecError {
    tracing::warn!(path = %path.display(), %reason, "rejected archive");
    BSpecError::InvalidArchive(reason)
}

fn save_error(err: PackError) -> BSpecError {
    BSpecError::Serialization(err.to_string())
}
