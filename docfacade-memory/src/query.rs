//! The in-memory backend's native query value.

use bson::Bson;

use docfacade_core::backend::NativeQuery;

/// A predicate recorded by [`MemoryQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equal(String, Bson),
    NotEqual(String, Bson),
    LessThan(String, Bson),
    LessThanOrEqual(String, Bson),
    GreaterThan(String, Bson),
    GreaterThanOrEqual(String, Bson),
    ArrayContains(String, Bson),
    ArrayContainsAny(String, Vec<Bson>),
    In(String, Vec<Bson>),
    NotIn(String, Vec<Bson>),
    IsNull(String),
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Equal(field, _)
            | Predicate::NotEqual(field, _)
            | Predicate::LessThan(field, _)
            | Predicate::LessThanOrEqual(field, _)
            | Predicate::GreaterThan(field, _)
            | Predicate::GreaterThanOrEqual(field, _)
            | Predicate::ArrayContains(field, _)
            | Predicate::ArrayContainsAny(field, _)
            | Predicate::In(field, _)
            | Predicate::NotIn(field, _)
            | Predicate::IsNull(field) => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Query over one in-memory collection.
///
/// Predicates and sort keys are kept in the order they were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQuery {
    path: String,
    predicates: Vec<Predicate>,
    sort: Vec<SortKey>,
}

impl MemoryQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), predicates: Vec::new(), sort: Vec::new() }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

impl NativeQuery for MemoryQuery {
    fn path(&self) -> &str {
        &self.path
    }

    fn where_equal_to(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::Equal(field.to_string(), value))
    }

    fn where_not_equal_to(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::NotEqual(field.to_string(), value))
    }

    fn where_less_than(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::LessThan(field.to_string(), value))
    }

    fn where_less_than_or_equal_to(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::LessThanOrEqual(field.to_string(), value))
    }

    fn where_greater_than(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::GreaterThan(field.to_string(), value))
    }

    fn where_greater_than_or_equal_to(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::GreaterThanOrEqual(field.to_string(), value))
    }

    fn where_array_contains(self, field: &str, value: Bson) -> Self {
        self.with(Predicate::ArrayContains(field.to_string(), value))
    }

    fn where_array_contains_any(self, field: &str, values: Vec<Bson>) -> Self {
        self.with(Predicate::ArrayContainsAny(field.to_string(), values))
    }

    fn where_in(self, field: &str, values: Vec<Bson>) -> Self {
        self.with(Predicate::In(field.to_string(), values))
    }

    fn where_not_in(self, field: &str, values: Vec<Bson>) -> Self {
        self.with(Predicate::NotIn(field.to_string(), values))
    }

    fn where_is_null(self, field: &str) -> Self {
        self.with(Predicate::IsNull(field.to_string()))
    }

    fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.sort.push(SortKey { field: field.to_string(), descending });
        self
    }
}
