use bspec_query::Matches;
use bspec_store::Document;

use crate::error::{BSpecError, BSpecResult};

/// Documents matched by a query, in result order.
///
/// The result borrows the archive it came from, so the archive cannot be
/// mutated or closed while a result is alive. Drop the result (or call
/// [`QueryResult::free`]) to release it.
#[derive(Clone, Debug)]
pub struct QueryResult<'a> {
    documents: Vec<&'a Document>,
    total_matches: usize,
}

impl<'a> QueryResult<'a> {
    pub(crate) fn new(matches: Matches<'a, Document>) -> Self {
        Self {
            documents: matches.items,
            total_matches: matches.total,
        }
    }

    /// Number of documents in the result.
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Matches before `$offset`/`$limit` were applied.
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn get(&self, index: usize) -> Option<&'a Document> {
        self.documents.get(index).copied()
    }

    /// Serialize the document at `index` to JSON.
    pub fn document_json(&self, index: usize) -> BSpecResult<String> {
        let document = self.get(index).ok_or(BSpecError::IndexOutOfRange {
            index,
            count: self.count(),
        })?;
        Ok(document.to_json()?)
    }

    /// Serialize every document as a JSON array.
    pub fn to_json(&self) -> BSpecResult<String> {
        Ok(serde_json::to_string(&self.documents)?)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.documents.iter().copied().map(|d| d.id().as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Document> + '_ {
        self.documents.iter().copied()
    }

    /// Release the result explicitly.
    pub fn free(self) {}
}

impl<'a> IntoIterator for QueryResult<'a> {
    type Item = &'a Document;
    type IntoIter = std::vec::IntoIter<&'a Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
