use std::collections::HashMap;

use bspec_types::DocumentId;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Name of the member that carries a document's identifier.
pub const ID_FIELD: &str = "id";

/// A structured JSON document with a stable identifier.
///
/// The body is the complete JSON object as submitted, including its `"id"`
/// member, so serializing a document yields exactly what was stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    id: DocumentId,
    body: Map<String, Value>,
}

impl Document {
    /// Build a document from a JSON value.
    ///
    /// The value must be an object whose `"id"` member is a non-empty string.
    /// Schema rules beyond that belong to the caller's validator.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        let Value::Object(body) = value else {
            return Err(StoreError::MalformedDocument(
                "document must be a JSON object".into(),
            ));
        };
        let id = match body.get(ID_FIELD) {
            Some(Value::String(s)) => DocumentId::new(s.as_str())
                .map_err(|e| StoreError::MalformedDocument(e.to_string()))?,
            Some(_) => {
                return Err(StoreError::MalformedDocument(
                    "\"id\" must be a string".into(),
                ))
            }
            None => {
                return Err(StoreError::MalformedDocument(
                    "missing \"id\" field".into(),
                ))
            }
        };
        Ok(Self { id, body })
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Look up a top-level member.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(&self.body).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Serialize to compact JSON bytes.
    pub fn to_vec(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(&self.body).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

/// Outcome of inserting a document into a [`DocumentStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentChange {
    /// A new identifier was appended at the end.
    Inserted,
    /// An existing document was replaced in place.
    Replaced,
}

/// Ordered collection of documents keyed by identifier.
///
/// Iteration follows insertion order. Replacing a document keeps its
/// position; removing one shifts the later documents down.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    positions: HashMap<DocumentId, usize>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new document or replace the one with the same id.
    pub fn upsert(&mut self, document: Document) -> DocumentChange {
        match self.positions.get(document.id()) {
            Some(&pos) => {
                self.documents[pos] = document;
                DocumentChange::Replaced
            }
            None => {
                self.positions
                    .insert(document.id().clone(), self.documents.len());
                self.documents.push(document);
                DocumentChange::Inserted
            }
        }
    }

    /// Append a document, failing if its id is already present.
    pub fn insert_new(&mut self, document: Document) -> StoreResult<()> {
        if self.positions.contains_key(document.id()) {
            return Err(StoreError::DuplicateDocument(document.id().clone()));
        }
        self.upsert(document);
        Ok(())
    }

    /// Remove a document by id and return it.
    pub fn remove(&mut self, id: &str) -> StoreResult<Document> {
        let pos = self
            .positions
            .remove(id)
            .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))?;
        let removed = self.documents.remove(pos);
        for doc in &self.documents[pos..] {
            if let Some(p) = self.positions.get_mut(doc.id()) {
                *p -= 1;
            }
        }
        tracing::trace!(id, position = pos, "document removed from store");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.positions.get(id).map(|&pos| &self.documents[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> {
        self.documents.iter().map(Document::id)
    }
}

impl<'a> IntoIterator for &'a DocumentStore {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn ids(store: &DocumentStore) -> Vec<&str> {
        store.ids().map(DocumentId::as_str).collect()
    }

    // -----------------------------------------------------------------------
    // Document construction
    // -----------------------------------------------------------------------

    #[test]
    fn from_value_keeps_full_body() {
        let d = doc(json!({"id": "doc1", "title": "Hello"}));
        assert_eq!(d.id().as_str(), "doc1");
        assert_eq!(d.field("title"), Some(&json!("Hello")));
        assert_eq!(d.field("id"), Some(&json!("doc1")));
    }

    #[test]
    fn from_value_rejects_non_object() {
        let err = Document::from_value(json!(["doc1"])).unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument(_)));
    }

    #[test]
    fn from_value_rejects_missing_or_bad_id() {
        assert!(Document::from_value(json!({"title": "x"})).is_err());
        assert!(Document::from_value(json!({"id": 7})).is_err());
        assert!(Document::from_value(json!({"id": ""})).is_err());
    }

    #[test]
    fn from_value_accepts_blank_id() {
        let d = doc(json!({"id": " "}));
        assert_eq!(d.id().as_str(), " ");
    }

    #[test]
    fn to_json_reproduces_body() {
        let d = doc(json!({"id": "a", "n": 1, "nested": {"k": [1, 2]}}));
        let back: Value = serde_json::from_str(&d.to_json().unwrap()).unwrap();
        assert_eq!(back, json!({"id": "a", "n": 1, "nested": {"k": [1, 2]}}));
        assert_eq!(serde_json::to_value(&d).unwrap(), back);
    }

    // -----------------------------------------------------------------------
    // Store ordering
    // -----------------------------------------------------------------------

    #[test]
    fn upsert_appends_new_ids_in_order() {
        let mut store = DocumentStore::new();
        for id in ["c", "a", "b"] {
            assert_eq!(store.upsert(doc(json!({"id": id}))), DocumentChange::Inserted);
        }
        assert_eq!(ids(&store), vec!["c", "a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = DocumentStore::new();
        store.upsert(doc(json!({"id": "a", "v": 1})));
        store.upsert(doc(json!({"id": "b", "v": 1})));
        store.upsert(doc(json!({"id": "c", "v": 1})));

        let change = store.upsert(doc(json!({"id": "b", "v": 2})));
        assert_eq!(change, DocumentChange::Replaced);
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.get("b").unwrap().field("v"), Some(&json!(2)));
    }

    #[test]
    fn remove_shifts_positions() {
        let mut store = DocumentStore::new();
        for id in ["a", "b", "c", "d"] {
            store.upsert(doc(json!({"id": id})));
        }
        let removed = store.remove("b").unwrap();
        assert_eq!(removed.id().as_str(), "b");
        assert_eq!(ids(&store), vec!["a", "c", "d"]);
        assert_eq!(store.get("c").unwrap().id().as_str(), "c");
        assert_eq!(store.get("d").unwrap().id().as_str(), "d");
    }

    #[test]
    fn remove_missing_is_error() {
        let mut store = DocumentStore::new();
        let err = store.remove("ghost").unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(id) if id == "ghost"));
    }

    #[test]
    fn readd_after_remove_goes_to_end() {
        let mut store = DocumentStore::new();
        for id in ["a", "b", "c"] {
            store.upsert(doc(json!({"id": id})));
        }
        store.remove("a").unwrap();
        store.upsert(doc(json!({"id": "a"})));
        assert_eq!(ids(&store), vec!["b", "c", "a"]);
    }

    #[test]
    fn insert_new_rejects_duplicates() {
        let mut store = DocumentStore::new();
        store.insert_new(doc(json!({"id": "a"}))).unwrap();
        let err = store.insert_new(doc(json!({"id": "a"}))).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDocument(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn contains_tracks_membership() {
        let mut store = DocumentStore::new();
        store.upsert(doc(json!({"id": "a"})));
        assert!(store.contains("a"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
        assert!(!store.contains("a"));
    }
}
