//! JSON query language for BSpec documents.
//!
//! A query is a JSON object. Plain members are equality tests on dotted field
//! paths; operator objects (`{"$gt": 3}`) express comparisons; `$and`, `$or`
//! and `$not` combine sub-queries; `$text` searches every string value.
//! `$sort`, `$offset` and `$limit` shape the result.
//!
//! ```text
//! {"type": "BRD", "priority": {"$lte": 2}, "$sort": {"title": "asc"}, "$limit": 10}
//! ```
//!
//! Parsing produces a [`Query`]; [`Query::execute`] runs it as a stable filter
//! over any sequence of document bodies.

pub mod engine;
pub mod error;
pub mod parser;
pub mod path;
pub mod predicate;

pub use engine::Matches;
pub use error::{QueryError, QueryParseResult};
pub use parser::{Query, SortDirection, SortKey};
pub use path::FieldPath;
pub use predicate::{Condition, Predicate};
