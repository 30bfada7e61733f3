use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::path::FieldPath;

/// A single comparison applied to the value found at a field path.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    /// Substring for strings, element membership for arrays.
    Contains(Value),
    Prefix(String),
}

impl Condition {
    /// Evaluate against the resolved field, `None` when the field is absent.
    ///
    /// An absent field only satisfies `$exists: false`.
    pub fn matches(&self, field: Option<&Value>) -> bool {
        let Some(value) = field else {
            return matches!(self, Self::Exists(false));
        };
        match self {
            Self::Eq(operand) => values_equal(value, operand),
            Self::Ne(operand) => !values_equal(value, operand),
            Self::Gt(operand) => compare_same_type(value, operand) == Some(Ordering::Greater),
            Self::Gte(operand) => matches!(
                compare_same_type(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt(operand) => compare_same_type(value, operand) == Some(Ordering::Less),
            Self::Lte(operand) => matches!(
                compare_same_type(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::In(options) => options.iter().any(|o| values_equal(value, o)),
            Self::Nin(options) => !options.iter().any(|o| values_equal(value, o)),
            Self::Exists(expected) => *expected,
            Self::Contains(operand) => match (value, operand) {
                (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
                (Value::Array(items), needle) => items.iter().any(|i| values_equal(i, needle)),
                _ => false,
            },
            Self::Prefix(prefix) => value
                .as_str()
                .is_some_and(|s| s.starts_with(prefix.as_str())),
        }
    }
}

/// A boolean filter over document bodies.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Matches every document.
    All,
    Field { path: FieldPath, condition: Condition },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Case-insensitive substring search over every string value. The term is
    /// stored lowercased.
    Text(String),
}

impl Predicate {
    pub fn matches(&self, body: &Map<String, Value>) -> bool {
        match self {
            Self::All => true,
            Self::Field { path, condition } => condition.matches(path.resolve(body)),
            Self::And(preds) => preds.iter().all(|p| p.matches(body)),
            Self::Or(preds) => preds.iter().any(|p| p.matches(body)),
            Self::Not(pred) => !pred.matches(body),
            Self::Text(term) => body.values().any(|v| contains_text(v, term)),
        }
    }

    /// Combine predicates with AND, collapsing the trivial cases.
    pub(crate) fn all_of(mut preds: Vec<Predicate>) -> Self {
        match preds.len() {
            0 => Self::All,
            1 => preds.remove(0),
            _ => Self::And(preds),
        }
    }
}

fn contains_text(value: &Value, term: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(term),
        Value::Array(items) => items.iter().any(|v| contains_text(v, term)),
        Value::Object(map) => map.values().any(|v| contains_text(v, term)),
        _ => false,
    }
}

/// Equality where numbers compare by value (`1 == 1.0`), recursively.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Order two values of the same scalar type; `None` across types.
pub fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                Some(x.cmp(&y))
            } else {
                x.as_f64()?.partial_cmp(&y.as_f64()?)
            }
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used by `$sort`: same-type scalars compare naturally,
/// otherwise values group by type (null, bool, number, string, array,
/// object).
pub fn sort_order(a: &Value, b: &Value) -> Ordering {
    compare_same_type(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    fn field(path: &str, condition: Condition) -> Predicate {
        Predicate::Field {
            path: path.parse().unwrap(),
            condition,
        }
    }

    // -----------------------------------------------------------------------
    // Value helpers
    // -----------------------------------------------------------------------

    #[test]
    fn numbers_equal_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!values_equal(&json!(1), &json!("1")));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn comparison_requires_same_type() {
        assert_eq!(compare_same_type(&json!(2), &json!(10)), Some(Ordering::Less));
        assert_eq!(compare_same_type(&json!(2.5), &json!(2)), Some(Ordering::Greater));
        assert_eq!(compare_same_type(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(compare_same_type(&json!(true), &json!(false)), Some(Ordering::Greater));
        assert_eq!(compare_same_type(&json!("10"), &json!(9)), None);
        assert_eq!(compare_same_type(&json!(null), &json!(null)), None);
    }

    #[test]
    fn sort_order_groups_by_type() {
        assert_eq!(sort_order(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(sort_order(&json!(5), &json!("a")), Ordering::Less);
        assert_eq!(sort_order(&json!([1]), &json!("z")), Ordering::Greater);
        assert_eq!(sort_order(&json!("a"), &json!("b")), Ordering::Less);
    }

    // -----------------------------------------------------------------------
    // Conditions
    // -----------------------------------------------------------------------

    #[test]
    fn absent_field_only_matches_exists_false() {
        let conditions = [
            Condition::Eq(json!(1)),
            Condition::Ne(json!(1)),
            Condition::Nin(vec![json!(1)]),
            Condition::Contains(json!("x")),
            Condition::Exists(true),
        ];
        for c in &conditions {
            assert!(!c.matches(None), "{c:?}");
        }
        assert!(Condition::Exists(false).matches(None));
    }

    #[test]
    fn range_operators() {
        let v = json!(5);
        assert!(Condition::Gt(json!(4)).matches(Some(&v)));
        assert!(!Condition::Gt(json!(5)).matches(Some(&v)));
        assert!(Condition::Gte(json!(5)).matches(Some(&v)));
        assert!(Condition::Lt(json!(5.5)).matches(Some(&v)));
        assert!(Condition::Lte(json!(5)).matches(Some(&v)));
        assert!(!Condition::Lt(json!("9")).matches(Some(&v)));
    }

    #[test]
    fn set_membership() {
        let v = json!("draft");
        assert!(Condition::In(vec![json!("draft"), json!("final")]).matches(Some(&v)));
        assert!(!Condition::Nin(vec![json!("draft")]).matches(Some(&v)));
        assert!(Condition::Nin(vec![json!("final")]).matches(Some(&v)));
    }

    #[test]
    fn contains_and_prefix() {
        let title = json!("Hello World");
        let tags = json!(["a", "b", 3]);
        assert!(Condition::Contains(json!("lo W")).matches(Some(&title)));
        assert!(!Condition::Contains(json!("hello")).matches(Some(&title)));
        assert!(Condition::Contains(json!("b")).matches(Some(&tags)));
        assert!(Condition::Contains(json!(3.0)).matches(Some(&tags)));
        assert!(!Condition::Contains(json!(1)).matches(Some(&json!(123))));
        assert!(Condition::Prefix("Hel".into()).matches(Some(&title)));
        assert!(!Condition::Prefix("Hel".into()).matches(Some(&json!(1))));
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    #[test]
    fn boolean_combinators() {
        let doc = body(json!({"id": "a", "n": 3, "kind": "note"}));
        let n3 = field("n", Condition::Eq(json!(3)));
        let task = field("kind", Condition::Eq(json!("task")));

        assert!(Predicate::All.matches(&doc));
        assert!(!Predicate::And(vec![n3.clone(), task.clone()]).matches(&doc));
        assert!(Predicate::Or(vec![n3.clone(), task.clone()]).matches(&doc));
        assert!(Predicate::Not(Box::new(task)).matches(&doc));
    }

    #[test]
    fn text_search_walks_nested_strings() {
        let doc = body(json!({
            "id": "a",
            "sections": [{"body": "Revenue GROWTH targets"}],
            "count": 7
        }));
        assert!(Predicate::Text("growth".into()).matches(&doc));
        assert!(!Predicate::Text("decline".into()).matches(&doc));
        assert!(!Predicate::Text("7".into()).matches(&doc));
    }

    #[test]
    fn all_of_collapses() {
        assert_eq!(Predicate::all_of(vec![]), Predicate::All);
        let single = field("a", Condition::Exists(true));
        assert_eq!(Predicate::all_of(vec![single.clone()]), single);
    }
}
