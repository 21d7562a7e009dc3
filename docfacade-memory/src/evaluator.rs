//! Predicate evaluation for in-memory queries.
//!
//! This module provides the evaluation engine for [`MemoryQuery`](crate::query::MemoryQuery)
//! predicates and sort keys over BSON documents.

use bson::{Bson, Document, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use crate::query::{Predicate, SortKey};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that `1`, `1i64` and `1.0` compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// All integers and floats normalized to f64
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Types with no ordering or equality semantics here (binary, regex, ...)
    Other,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Other,
        }
    }
}

impl Comparable<'_> {
    /// Position of the value's type in the cross-type sort order.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Number(_) => 2,
            Comparable::DateTime(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::Map(_) => 6,
            Comparable::Other => 7,
        }
    }

    /// Total order used for sorting: by type first, then by value within a type.
    ///
    /// Maps and uncomparable types are equal to every value of their own type.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
            (Comparable::Array(a), Comparable::Array(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.sort_cmp(y))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self
                .type_rank()
                .cmp(&other.type_rank())
                .then_with(|| self.partial_cmp(other).unwrap_or(Ordering::Equal)),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    /// Only values of the same type are ordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a dot-separated field path (`address.city`) inside `document`.
pub(crate) fn lookup<'a>(document: &'a Document, field: &str) -> Option<&'a Bson> {
    let mut segments = field.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }

    Some(current)
}

fn compare(field_value: &Bson, value: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    Comparable::from(field_value)
        .partial_cmp(&Comparable::from(value))
        .is_some_and(accept)
}

fn contains(values: &[Bson], needle: &Comparable<'_>) -> bool {
    values.iter().any(|value| &Comparable::from(value) == needle)
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// True when the document satisfies every predicate.
    pub fn matches_all(&self, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|predicate| self.matches(predicate))
    }

    /// Evaluates one predicate. A missing field never matches.
    pub fn matches(&self, predicate: &Predicate) -> bool {
        let Some(field_value) = lookup(self.document, predicate.field()) else {
            return false;
        };

        match predicate {
            Predicate::Equal(_, value) => Comparable::from(field_value) == Comparable::from(value),
            Predicate::NotEqual(_, value) => Comparable::from(field_value) != Comparable::from(value),
            Predicate::LessThan(_, value) => compare(field_value, value, Ordering::is_lt),
            Predicate::LessThanOrEqual(_, value) => compare(field_value, value, Ordering::is_le),
            Predicate::GreaterThan(_, value) => compare(field_value, value, Ordering::is_gt),
            Predicate::GreaterThanOrEqual(_, value) => compare(field_value, value, Ordering::is_ge),
            Predicate::ArrayContains(_, value) => match field_value {
                Bson::Array(items) => contains(items, &Comparable::from(value)),
                _ => false,
            },
            Predicate::ArrayContainsAny(_, values) => match field_value {
                Bson::Array(items) => values
                    .iter()
                    .any(|value| contains(items, &Comparable::from(value))),
                _ => false,
            },
            Predicate::In(_, values) => contains(values, &Comparable::from(field_value)),
            Predicate::NotIn(_, values) => !contains(values, &Comparable::from(field_value)),
            Predicate::IsNull(_) => matches!(field_value, Bson::Null),
        }
    }

    /// Compares two documents by `keys`, first key first.
    ///
    /// Values of different types order by type: null, booleans, numbers, timestamps, strings,
    /// arrays, maps.
    pub fn compare_by(left: &Document, right: &Document, keys: &[SortKey]) -> Ordering {
        for key in keys {
            let (a, b) = match (lookup(left, &key.field), lookup(right, &key.field)) {
                (Some(a), Some(b)) => (Comparable::from(a), Comparable::from(b)),
                _ => continue,
            };

            let ordering = a.sort_cmp(&b);
            let ordering = if key.descending { ordering.reverse() } else { ordering };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }

    /// True when the document has every field named in `keys`.
    pub fn has_sort_fields(&self, keys: &[SortKey]) -> bool {
        keys.iter().all(|key| lookup(self.document, &key.field).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{bson, doc};

    fn eval(document: &Document, predicate: Predicate) -> bool {
        DocumentEvaluator::new(document).matches(&predicate)
    }

    #[test]
    fn test_numeric_normalization() {
        let document = doc! { "n": 3i64 };
        assert!(eval(&document, Predicate::Equal("n".into(), bson!(3.0))));
        assert!(eval(&document, Predicate::GreaterThan("n".into(), bson!(2))));
        assert!(!eval(&document, Predicate::LessThan("n".into(), bson!("9"))));
    }

    #[test]
    fn test_missing_fields_never_match() {
        let document = doc! { "a": 1 };
        assert!(!eval(&document, Predicate::NotEqual("b".into(), bson!(1))));
        assert!(!eval(&document, Predicate::NotIn("b".into(), vec![bson!(1)])));
        assert!(!eval(&document, Predicate::IsNull("b".into())));
    }

    #[test]
    fn test_array_predicates() {
        let document = doc! { "tags": ["rust", "db"] };
        assert!(eval(&document, Predicate::ArrayContains("tags".into(), bson!("db"))));
        assert!(eval(
            &document,
            Predicate::ArrayContainsAny("tags".into(), vec![bson!("go"), bson!("rust")])
        ));
        assert!(!eval(&document, Predicate::ArrayContainsAny("tags".into(), vec![])));
    }

    #[test]
    fn test_nested_lookup() {
        let document = doc! { "address": { "city": "Oslo" } };
        assert!(eval(&document, Predicate::Equal("address.city".into(), bson!("Oslo"))));
    }

    #[test]
    fn test_compare_by_multiple_keys() {
        let keys = vec![
            SortKey { field: "a".into(), descending: false },
            SortKey { field: "b".into(), descending: true },
        ];
        let left = doc! { "a": 1, "b": 1 };
        let right = doc! { "a": 1, "b": 2 };

        assert_eq!(DocumentEvaluator::compare_by(&left, &right, &keys), Ordering::Greater);
    }

    #[test]
    fn test_compare_by_mixed_types_orders_by_type() {
        let keys = vec![SortKey { field: "v".into(), descending: false }];
        let mut documents = vec![
            doc! { "v": "b" },
            doc! { "v": 10 },
            doc! { "v": [1, 2] },
            doc! { "v": "a" },
            doc! { "v": true },
            doc! { "v": 2.5 },
            doc! { "v": Bson::Null },
            doc! { "v": [1] },
        ];

        documents.sort_by(|a, b| DocumentEvaluator::compare_by(a, b, &keys));

        let values = documents
            .iter()
            .map(|document| document.get("v").cloned().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            values,
            vec![
                Bson::Null,
                bson!(true),
                bson!(2.5),
                bson!(10),
                bson!("a"),
                bson!("b"),
                bson!([1]),
                bson!([1, 2]),
            ]
        );
    }

    #[test]
    fn test_compare_by_mixed_types_descending() {
        let keys = vec![SortKey { field: "v".into(), descending: true }];

        assert_eq!(
            DocumentEvaluator::compare_by(&doc! { "v": "x" }, &doc! { "v": 99 }, &keys),
            Ordering::Less
        );
    }
}
