use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{QueryError, QueryParseResult};
use crate::path::FieldPath;
use crate::predicate::{Condition, Predicate};

/// Direction of a `$sort` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub path: FieldPath,
    pub direction: SortDirection,
}

/// A parsed query: a filter plus ordering and paging options.
///
/// ```
/// use bspec_query::Query;
///
/// let q: Query = r#"{"status": {"$in": ["draft", "review"]}, "$limit": 10}"#
///     .parse()
///     .unwrap();
/// assert_eq!(q.limit, Some(10));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub filter: Predicate,
    pub sort: Vec<SortKey>,
    pub offset: usize,
    /// `None` means unbounded. `$limit: 0` also means unbounded.
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl Query {
    /// The empty query, matching every document.
    pub fn all() -> Self {
        Self {
            filter: Predicate::All,
            sort: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Parse a query from an already-decoded JSON value.
    pub fn parse(value: &Value) -> QueryParseResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| QueryError::NotAnObject(json_type(value)))?;

        let mut query = Self::all();
        let mut filters = Vec::with_capacity(obj.len());
        for (key, operand) in obj {
            match key.as_str() {
                "$sort" => query.sort = parse_sort(operand)?,
                "$limit" => {
                    query.limit = Some(parse_count(key, operand)?).filter(|&n| n > 0);
                }
                "$offset" => query.offset = parse_count(key, operand)?,
                _ => filters.push(parse_entry(key, operand)?),
            }
        }
        query.filter = Predicate::all_of(filters);
        Ok(query)
    }

    /// Whether a single document body passes the filter.
    pub fn matches(&self, body: &Map<String, Value>) -> bool {
        self.filter.matches(body)
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| QueryError::MalformedJson(e.to_string()))?;
        Self::parse(&value)
    }
}

/// Parse a nested filter object (inside `$and`, `$or`, `$not`).
fn parse_filter(value: &Value) -> QueryParseResult<Predicate> {
    let obj = value
        .as_object()
        .ok_or_else(|| QueryError::NotAnObject(json_type(value)))?;
    let filters = obj
        .iter()
        .map(|(key, operand)| match key.as_str() {
            "$sort" | "$limit" | "$offset" => Err(QueryError::NestedOption(key.clone())),
            _ => parse_entry(key, operand),
        })
        .collect::<QueryParseResult<Vec<_>>>()?;
    Ok(Predicate::all_of(filters))
}

/// Parse one `key: operand` member of a filter object.
fn parse_entry(key: &str, operand: &Value) -> QueryParseResult<Predicate> {
    match key {
        "$and" => Ok(Predicate::And(parse_clauses(key, operand)?)),
        "$or" => Ok(Predicate::Or(parse_clauses(key, operand)?)),
        "$not" => Ok(Predicate::Not(Box::new(parse_filter(operand)?))),
        "$text" => {
            let term = operand.as_str().ok_or_else(|| invalid(key, "expected a string"))?;
            Ok(Predicate::Text(term.to_lowercase()))
        }
        _ if key.starts_with('$') => Err(QueryError::UnknownOperator(key.to_string())),
        _ => parse_field(key, operand),
    }
}

fn parse_clauses(op: &str, operand: &Value) -> QueryParseResult<Vec<Predicate>> {
    match operand {
        Value::Array(items) if !items.is_empty() => items.iter().map(parse_filter).collect(),
        Value::Array(_) => Err(invalid(op, "expected a non-empty array")),
        _ => Err(invalid(op, "expected an array of queries")),
    }
}

fn parse_field(key: &str, operand: &Value) -> QueryParseResult<Predicate> {
    let path: FieldPath = key.parse()?;

    let ops = match operand {
        Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => obj,
        _ => {
            return Ok(Predicate::Field {
                path,
                condition: Condition::Eq(operand.clone()),
            })
        }
    };
    if ops.keys().any(|k| !k.starts_with('$')) {
        return Err(QueryError::MixedCondition(key.to_string()));
    }

    let conditions = ops
        .iter()
        .map(|(op, arg)| -> QueryParseResult<Predicate> {
            Ok(Predicate::Field {
                path: path.clone(),
                condition: parse_condition(op, arg)?,
            })
        })
        .collect::<QueryParseResult<Vec<_>>>()?;
    Ok(Predicate::all_of(conditions))
}

fn parse_condition(op: &str, arg: &Value) -> QueryParseResult<Condition> {
    let condition = match op {
        "$eq" => Condition::Eq(arg.clone()),
        "$ne" => Condition::Ne(arg.clone()),
        "$gt" => Condition::Gt(arg.clone()),
        "$gte" => Condition::Gte(arg.clone()),
        "$lt" => Condition::Lt(arg.clone()),
        "$lte" => Condition::Lte(arg.clone()),
        "$in" | "$nin" => {
            let options = arg
                .as_array()
                .ok_or_else(|| invalid(op, "expected an array"))?
                .clone();
            if op == "$in" {
                Condition::In(options)
            } else {
                Condition::Nin(options)
            }
        }
        "$exists" => Condition::Exists(
            arg.as_bool()
                .ok_or_else(|| invalid(op, "expected a boolean"))?,
        ),
        "$contains" => Condition::Contains(arg.clone()),
        "$prefix" => Condition::Prefix(
            arg.as_str()
                .ok_or_else(|| invalid(op, "expected a string"))?
                .to_string(),
        ),
        _ => return Err(QueryError::UnknownOperator(op.to_string())),
    };
    Ok(condition)
}

fn parse_sort(operand: &Value) -> QueryParseResult<Vec<SortKey>> {
    match operand {
        Value::String(path) => Ok(vec![SortKey {
            path: path.parse()?,
            direction: SortDirection::Asc,
        }]),
        Value::Object(keys) if !keys.is_empty() => keys
            .iter()
            .map(|(path, dir)| -> QueryParseResult<SortKey> {
                Ok(SortKey {
                    path: path.parse()?,
                    direction: parse_direction(dir)?,
                })
            })
            .collect(),
        Value::Array(items) if !items.is_empty() => {
            let mut keys = Vec::new();
            for item in items {
                keys.extend(parse_sort(item)?);
            }
            Ok(keys)
        }
        _ => Err(invalid(
            "$sort",
            "expected a field path, an object of directions, or an array of those",
        )),
    }
}

fn parse_direction(value: &Value) -> QueryParseResult<SortDirection> {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
        Value::String(s) if s.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(SortDirection::Asc),
        Value::Number(n) if n.as_i64() == Some(-1) => Ok(SortDirection::Desc),
        _ => Err(invalid("$sort", "direction must be \"asc\", \"desc\", 1 or -1")),
    }
}

fn parse_count(op: &str, value: &Value) -> QueryParseResult<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(op, "expected a non-negative integer"))
}

fn invalid(op: &str, reason: &str) -> QueryError {
    QueryError::InvalidOperand {
        op: op.to_string(),
        reason: reason.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Query {
        Query::parse(&value).unwrap()
    }

    fn parse_err(value: Value) -> QueryError {
        Query::parse(&value).unwrap_err()
    }

    fn field(path: &str, condition: Condition) -> Predicate {
        Predicate::Field {
            path: path.parse().unwrap(),
            condition,
        }
    }

    // -----------------------------------------------------------------------
    // Accepted shapes
    // -----------------------------------------------------------------------

    #[test]
    fn empty_object_matches_all() {
        assert_eq!(parse(json!({})), Query::all());
    }

    #[test]
    fn literal_is_equality() {
        let q = parse(json!({"title": "Hello"}));
        assert_eq!(q.filter, field("title", Condition::Eq(json!("Hello"))));
    }

    #[test]
    fn object_without_operators_is_a_literal() {
        let q = parse(json!({"meta": {"owner": "ops"}}));
        assert_eq!(q.filter, field("meta", Condition::Eq(json!({"owner": "ops"}))));
    }

    #[test]
    fn multiple_operators_on_one_field_are_anded() {
        let q = parse(json!({"n": {"$gte": 1, "$lt": 5}}));
        assert_eq!(
            q.filter,
            Predicate::And(vec![
                field("n", Condition::Gte(json!(1))),
                field("n", Condition::Lt(json!(5))),
            ])
        );
    }

    #[test]
    fn logical_operators_nest() {
        let q = parse(json!({
            "$or": [{"type": "BRD"}, {"$not": {"status": "draft"}}]
        }));
        assert_eq!(
            q.filter,
            Predicate::Or(vec![
                field("type", Condition::Eq(json!("BRD"))),
                Predicate::Not(Box::new(field("status", Condition::Eq(json!("draft"))))),
            ])
        );
    }

    #[test]
    fn text_term_is_lowercased() {
        let q = parse(json!({"$text": "Growth"}));
        assert_eq!(q.filter, Predicate::Text("growth".into()));
    }

    #[test]
    fn sort_forms() {
        let single = parse(json!({"$sort": "title"}));
        assert_eq!(single.sort.len(), 1);
        assert_eq!(single.sort[0].direction, SortDirection::Asc);

        let multi = parse(json!({"$sort": {"priority": "desc", "title": 1}}));
        let paths: Vec<String> = multi.sort.iter().map(|k| k.path.to_string()).collect();
        assert_eq!(paths, vec!["priority", "title"]);
        assert_eq!(multi.sort[0].direction, SortDirection::Desc);
        assert_eq!(multi.sort[1].direction, SortDirection::Asc);

        let list = parse(json!({"$sort": [{"b": "desc"}, "a"]}));
        assert_eq!(list.sort[0].path.to_string(), "b");
        assert_eq!(list.sort[1].path.to_string(), "a");
    }

    #[test]
    fn paging_options() {
        let q = parse(json!({"$limit": 5, "$offset": 2}));
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.offset, 2);
        assert_eq!(parse(json!({"$limit": 0})).limit, None);
    }

    #[test]
    fn from_str_reports_malformed_json() {
        let err = "{not json".parse::<Query>().unwrap_err();
        assert!(matches!(err, QueryError::MalformedJson(_)));
    }

    // -----------------------------------------------------------------------
    // Rejected shapes
    // -----------------------------------------------------------------------

    #[test]
    fn top_level_must_be_object() {
        assert_eq!(parse_err(json!([1, 2])), QueryError::NotAnObject("array"));
        assert_eq!(parse_err(json!("title")), QueryError::NotAnObject("string"));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        assert!(matches!(
            parse_err(json!({"$where": "x"})),
            QueryError::UnknownOperator(op) if op == "$where"
        ));
        assert!(matches!(
            parse_err(json!({"n": {"$regex": "x"}})),
            QueryError::UnknownOperator(_)
        ));
    }

    #[test]
    fn mixed_condition_is_rejected() {
        assert!(matches!(
            parse_err(json!({"n": {"$gt": 1, "plain": 2}})),
            QueryError::MixedCondition(_)
        ));
    }

    #[test]
    fn bad_operands_are_rejected() {
        for bad in [
            json!({"n": {"$in": 3}}),
            json!({"n": {"$nin": "x"}}),
            json!({"n": {"$exists": "yes"}}),
            json!({"n": {"$prefix": 1}}),
            json!({"$and": []}),
            json!({"$or": {"a": 1}}),
            json!({"$text": 5}),
            json!({"$limit": -1}),
            json!({"$offset": 1.5}),
            json!({"$sort": {"a": "sideways"}}),
            json!({"$sort": 3}),
        ] {
            assert!(
                matches!(Query::parse(&bad), Err(QueryError::InvalidOperand { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn bad_paths_are_rejected() {
        assert!(matches!(parse_err(json!({"a..b": 1})), QueryError::InvalidPath { .. }));
        assert!(matches!(parse_err(json!({"": 1})), QueryError::InvalidPath { .. }));
    }

    #[test]
    fn paging_inside_nested_filter_is_rejected() {
        assert!(matches!(
            parse_err(json!({"$not": {"$limit": 1}})),
            QueryError::NestedOption(_)
        ));
    }
}
