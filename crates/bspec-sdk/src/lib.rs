//! High-level SDK for BSpec archives.
//!
//! An [`Archive`] is a single `.bspec` file holding JSON documents and
//! binary assets. This crate is the entry point for applications embedding
//! the format: it opens and saves archives, gates documents through the
//! [`Validator`], and runs JSON queries that return a borrowed
//! [`QueryResult`].
//!
//! ```no_run
//! use bspec_sdk::Archive;
//!
//! # fn main() -> Result<(), bspec_sdk::BSpecError> {
//! let mut archive = Archive::create("demo");
//! archive.add_document(r#"{"id":"doc1","title":"Hello"}"#)?;
//! archive.save("demo.bspec")?;
//!
//! let archive = Archive::open("demo.bspec")?;
//! let result = archive.query(r#"{"title":"Hello"}"#)?;
//! assert_eq!(result.count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod conformance;
pub mod error;
pub mod relations;
pub mod result;
pub mod stats;
pub mod validator;
pub mod version;

pub use archive::Archive;
pub use config::{ArchiveConfig, ValidationConfig};
pub use conformance::ConformanceLevel;
pub use error::{error_message, BSpecError, BSpecResult, ErrorCode};
pub use result::QueryResult;
pub use stats::ArchiveStats;
pub use validator::{
    validate_document, Severity, ValidationReport, Validator, Violation, ViolationKind,
};
pub use version::{build_info, version};

// Re-export key types
pub use bspec_pack::ArchiveManifest;
pub use bspec_query::Query;
pub use bspec_store::{AssetChange, Document, DocumentChange};
pub use bspec_types::{AssetPath, DocumentId, ObjectId};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn demo_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.bspec");

        let mut archive = Archive::create("demo");
        archive
            .add_document(r#"{"id":"doc1","title":"Hello"}"#)
            .unwrap();
        archive.add_asset("img/logo.png", vec![7u8; 10]).unwrap();
        archive.save(&path).unwrap();
        archive.close();

        let archive = Archive::open(&path).unwrap();
        let result = archive.query(r#"{"title":"Hello"}"#).unwrap();
        assert_eq!(result.count(), 1);
        let doc = parse(&result.document_json(0).unwrap());
        assert_eq!(doc["id"], json!("doc1"));
        assert!(result.document_json(1).is_err());
        result.free();
        archive.close();
    }

    #[test]
    fn added_document_is_found_by_id() {
        let mut archive = Archive::create("props");
        let json = r#"{"id":"alpha","n":1.5,"nested":{"k":[1,2]}}"#;
        archive.add_document(json).unwrap();

        let result = archive.query(r#"{"id":"alpha"}"#).unwrap();
        assert_eq!(result.count(), 1);
        assert_eq!(parse(&result.document_json(0).unwrap()), parse(json));
    }

    #[test]
    fn removed_document_is_not_found() {
        let mut archive = Archive::create("props");
        archive.add_document(r#"{"id":"alpha"}"#).unwrap();
        archive.remove_document("alpha").unwrap();
        assert_eq!(archive.query(r#"{"id":"alpha"}"#).unwrap().count(), 0);
    }

    #[test]
    fn error_lookup_and_version() {
        assert_eq!(error_message(ErrorCode::InvalidQuery.code()), "Invalid query");
        assert!(build_info().contains(version()));
    }

    fn doc_strategy() -> impl Strategy<Value = (String, i64, String)> {
        ("[a-z][a-z0-9-]{0,12}", any::<i64>(), "\\PC{0,20}")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn save_open_preserves_documents_and_assets(
            docs in prop::collection::vec(doc_strategy(), 0..12),
            assets in prop::collection::btree_map("[a-z]{1,8}(/[a-z]{1,8})?", prop::collection::vec(any::<u8>(), 0..64), 0..6),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prop.bspec");

            let mut archive = Archive::create("prop");
            for (id, n, text) in &docs {
                let body = json!({"id": id, "n": n, "text": text});
                archive.add_document(&body.to_string()).unwrap();
            }
            for (asset_path, data) in &assets {
                archive.add_asset(asset_path, data.clone()).unwrap();
            }
            archive.save(&path).unwrap();

            let reopened = Archive::open(&path).unwrap();
            let before: Vec<&Document> = archive.documents().collect();
            let after: Vec<&Document> = reopened.documents().collect();
            prop_assert_eq!(before, after);

            prop_assert_eq!(reopened.asset_paths().unwrap(), archive.asset_paths().unwrap());
            for (asset_path, data) in &assets {
                prop_assert_eq!(&reopened.asset(asset_path).unwrap(), data);
            }
        }

        #[test]
        fn unsorted_query_preserves_insertion_order(
            values in prop::collection::vec(0i64..4, 1..30),
            pick in 0i64..4,
        ) {
            let mut archive = Archive::create("order");
            for (i, v) in values.iter().enumerate() {
                archive.add_document(&json!({"id": format!("d{i}"), "v": v}).to_string()).unwrap();
            }
            let query = json!({"v": {"$ne": pick}}).to_string();
            let result = archive.query(&query).unwrap();
            let expected: Vec<String> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != pick)
                .map(|(i, _)| format!("d{i}"))
                .collect();
            let actual: Vec<String> = result.ids().map(str::to_string).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn out_of_range_index_is_always_an_error(count in 0usize..5, extra in 0usize..100) {
            let mut archive = Archive::create("range");
            for i in 0..count {
                archive.add_document(&json!({"id": format!("d{i}")}).to_string()).unwrap();
            }
            let result = archive.query("{}").unwrap();
            let err = result.document_json(count + extra).unwrap_err();
            let is_out_of_range = matches!(err, BSpecError::IndexOutOfRange { .. });
            prop_assert!(is_out_of_range);
        }
    }
}
