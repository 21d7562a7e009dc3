//! Filter and order specifications, and their translation into backend-native queries.
//!
//! A query request is described declaratively by a sequence of [`FilterSpec`]s and a sequence
//! of [`OrderSpec`]s. [`apply_filters`] and [`apply_order`] fold those sequences over a
//! [`NativeQuery`], one refinement per specification, in the order given.
//!
//! # Example
//!
//! ```ignore
//! use docfacade::query::{FilterSpec, OrderSpec, apply_filters_and_order};
//!
//! let filters = vec![
//!     FilterSpec::eq("status", "active"),
//!     FilterSpec::in_set("tier", ["gold", "silver"]),
//! ];
//! let orders = vec![OrderSpec::desc("created_at"), OrderSpec::asc("name")];
//!
//! let query = apply_filters_and_order(backend.collection_query("users"), &filters, &orders)?;
//! ```

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::{
    backend::NativeQuery,
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Predicate operators understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    ArrayContains,
    /// Array field contains at least one of the given values. Value must be an array.
    ArrayContainsAny,
    /// Field equals one of the given values. Value must be an array.
    InSet,
    /// Field equals none of the given values. Value must be an array.
    NotInSet,
    /// Field is explicitly null. Value is ignored.
    IsNull,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::ArrayContains,
        Operator::ArrayContainsAny,
        Operator::InSet,
        Operator::NotInSet,
        Operator::IsNull,
    ];

    /// Whether this operator takes a sequence of values rather than a single one.
    pub fn requires_sequence(&self) -> bool {
        matches!(
            self,
            Operator::ArrayContainsAny | Operator::InSet | Operator::NotInSet
        )
    }
}

/// A single predicate: `field <operator> value`.
///
/// Sequence operators always hold a `Bson::Array`; `IsNull` always holds `Bson::Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterSpec")]
pub struct FilterSpec {
    field: String,
    operator: Operator,
    value: Bson,
}

#[derive(Deserialize)]
struct RawFilterSpec {
    field: String,
    operator: Operator,
    #[serde(default)]
    value: Bson,
}

impl TryFrom<RawFilterSpec> for FilterSpec {
    type Error = DocumentStoreError;

    fn try_from(raw: RawFilterSpec) -> DocumentStoreResult<Self> {
        FilterSpec::new(raw.field, raw.operator, raw.value)
    }
}

impl FilterSpec {
    /// Creates a filter, failing fast when a sequence operator is given a non-array value.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Bson>,
    ) -> DocumentStoreResult<Self> {
        let field = field.into();
        let value = value.into();

        let value = match operator {
            Operator::IsNull => Bson::Null,
            op if op.requires_sequence() && !matches!(value, Bson::Array(_)) => {
                return Err(DocumentStoreError::invalid_argument(
                    None,
                    format!(
                        "Operator {op:?} on field `{field}` requires an array value, got {:?}",
                        value.element_type()
                    ),
                ));
            }
            _ => value,
        };

        Ok(Self { field, operator, value })
    }

    fn single(field: impl Into<String>, operator: Operator, value: impl Into<Bson>) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }

    fn sequence<V: Into<Bson>>(
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Bson::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::Equals, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::NotEquals, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::LessOrEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::GreaterOrEqual, value)
    }

    /// Matches documents whose array field contains `value`.
    pub fn array_contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::single(field, Operator::ArrayContains, value)
    }

    /// Matches documents whose array field contains any of `values`.
    pub fn array_contains_any<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::sequence(field, Operator::ArrayContainsAny, values)
    }

    pub fn in_set<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::sequence(field, Operator::InSet, values)
    }

    pub fn not_in_set<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::sequence(field, Operator::NotInSet, values)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::single(field, Operator::IsNull, Bson::Null)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Bson {
        &self.value
    }

    /// Applies this predicate to `query`.
    ///
    /// Every operator maps to exactly one [`NativeQuery`] method.
    pub fn apply<Q: NativeQuery>(&self, query: Q) -> DocumentStoreResult<Q> {
        let field = self.field.as_str();
        let value = self.value.clone();

        Ok(match self.operator {
            Operator::Equals => query.where_equal_to(field, value),
            Operator::NotEquals => query.where_not_equal_to(field, value),
            Operator::LessThan => query.where_less_than(field, value),
            Operator::LessOrEqual => query.where_less_than_or_equal_to(field, value),
            Operator::GreaterThan => query.where_greater_than(field, value),
            Operator::GreaterOrEqual => query.where_greater_than_or_equal_to(field, value),
            Operator::ArrayContains => query.where_array_contains(field, value),
            Operator::ArrayContainsAny => {
                let values = self.values(query.path())?;
                query.where_array_contains_any(field, values)
            }
            Operator::InSet => {
                let values = self.values(query.path())?;
                query.where_in(field, values)
            }
            Operator::NotInSet => {
                let values = self.values(query.path())?;
                query.where_not_in(field, values)
            }
            Operator::IsNull => query.where_is_null(field),
        })
    }

    fn values(&self, path: &str) -> DocumentStoreResult<Vec<Bson>> {
        match &self.value {
            Bson::Array(values) => Ok(values.clone()),
            other => Err(DocumentStoreError::invalid_argument(
                Some(path),
                format!(
                    "Operator {:?} on field `{}` requires an array value, got {:?}",
                    self.operator,
                    self.field,
                    other.element_type()
                ),
            )),
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self { field: field.into(), descending }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }

    pub fn apply<Q: NativeQuery>(&self, query: Q) -> Q {
        query.order_by(&self.field, self.descending)
    }
}

/// Folds `filters` over `query` in sequence order.
///
/// Zero filters return `query` unchanged.
pub fn apply_filters<Q: NativeQuery>(query: Q, filters: &[FilterSpec]) -> DocumentStoreResult<Q> {
    filters.iter().try_fold(query, |query, filter| {
        tracing::trace!(
            path = query.path(),
            field = filter.field(),
            operator = ?filter.operator(),
            "applying filter"
        );
        filter.apply(query)
    })
}

/// Folds `orders` over `query`; the first spec is the primary sort key.
pub fn apply_order<Q: NativeQuery>(query: Q, orders: &[OrderSpec]) -> Q {
    orders.iter().fold(query, |query, order| {
        tracing::trace!(
            path = query.path(),
            field = order.field.as_str(),
            descending = order.descending,
            "applying order"
        );
        order.apply(query)
    })
}

/// Applies `filters`, then `orders`.
pub fn apply_filters_and_order<Q: NativeQuery>(
    query: Q,
    filters: &[FilterSpec],
    orders: &[OrderSpec],
) -> DocumentStoreResult<Q> {
    Ok(apply_order(apply_filters(query, filters)?, orders))
}
