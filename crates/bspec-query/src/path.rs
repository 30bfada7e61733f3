use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::QueryError;

/// A dotted path into a document body, e.g. `meta.tags.0`.
///
/// Segments address object members by name. A segment that parses as a
/// non-negative integer also indexes into arrays, so `items.0.name` reaches
/// the first element's `name` member.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve the path against a document body.
    pub fn resolve<'a>(&self, root: &'a Map<String, Value>) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = root.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(obj) => obj.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl FromStr for FieldPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if let Some(pos) = segments.iter().position(String::is_empty) {
            return Err(QueryError::InvalidPath {
                path: s.to_string(),
                reason: format!("empty segment at index {pos}"),
            });
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
