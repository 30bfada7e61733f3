use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::parser::{Query, SortDirection, SortKey};
use crate::predicate::sort_order;

/// Documents selected by a query, in result order.
#[derive(Clone, Debug)]
pub struct Matches<'a, T> {
    /// Matching items after sorting and paging.
    pub items: Vec<&'a T>,
    /// Number of matches before `$offset` and `$limit` were applied.
    pub total: usize,
}

impl Query {
    /// Run the query over `items`, reading each item's body through `body`.
    ///
    /// Filtering is stable: without `$sort`, matches keep the order of
    /// `items`. Sorting is stable too, so ties keep input order.
    pub fn execute<'a, T, I, F>(&self, items: I, body: F) -> Matches<'a, T>
    where
        I: IntoIterator<Item = &'a T>,
        F: Fn(&T) -> &Map<String, Value>,
    {
        let mut matched: Vec<&'a T> = items
            .into_iter()
            .filter(|item| self.filter.matches(body(item)))
            .collect();

        if !self.sort.is_empty() {
            matched.sort_by(|a, b| compare_by_keys(&self.sort, body(a), body(b)));
        }

        let total = matched.len();
        let page: Vec<&'a T> = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        tracing::trace!(
            total,
            returned = page.len(),
            offset = self.offset,
            "query executed"
        );
        Matches { items: page, total }
    }
}

/// Compare two bodies by each sort key in turn. Missing fields always sort
/// after present ones, whatever the direction.
fn compare_by_keys(keys: &[SortKey], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    for key in keys {
        let ord = match (key.path.resolve(a), key.path.resolve(b)) {
            (Some(x), Some(y)) => match key.direction {
                SortDirection::Asc => sort_order(x, y),
                SortDirection::Desc => sort_order(y, x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
