//! Native query value for the MongoDB backend.
//!
//! Each applied filter becomes one clause of an `$and` filter document and each sort key one
//! entry of the sort document, in application order.

use bson::{Bson, Document, doc};

use docfacade_core::backend::NativeQuery;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MongoQuery {
    collection: String,
    clauses: Vec<Document>,
    sort: Document,
}

impl MongoQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), ..Default::default() }
    }

    /// The filter document passed to `find`.
    pub fn filter(&self) -> Document {
        match self.clauses.as_slice() {
            [] => doc! {},
            [single] => single.clone(),
            clauses => doc! { "$and": clauses.to_vec() },
        }
    }

    /// The sort document, or `None` when no order was applied.
    pub fn sort(&self) -> Option<Document> {
        (!self.sort.is_empty()).then(|| self.sort.clone())
    }

    fn clause(mut self, field: &str, condition: Document) -> Self {
        self.clauses.push(doc! { field: condition });
        self
    }
}

impl NativeQuery for MongoQuery {
    fn path(&self) -> &str {
        &self.collection
    }

    fn where_equal_to(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$eq": value })
    }

    /// Documents without the field do not match.
    fn where_not_equal_to(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$exists": true, "$ne": value })
    }

    fn where_less_than(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$lt": value })
    }

    fn where_less_than_or_equal_to(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$lte": value })
    }

    fn where_greater_than(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$gt": value })
    }

    fn where_greater_than_or_equal_to(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$gte": value })
    }

    fn where_array_contains(self, field: &str, value: Bson) -> Self {
        self.clause(field, doc! { "$elemMatch": { "$eq": value } })
    }

    fn where_array_contains_any(self, field: &str, values: Vec<Bson>) -> Self {
        self.clause(field, doc! { "$elemMatch": { "$in": values } })
    }

    fn where_in(self, field: &str, values: Vec<Bson>) -> Self {
        self.clause(field, doc! { "$in": values })
    }

    fn where_not_in(self, field: &str, values: Vec<Bson>) -> Self {
        self.clause(field, doc! { "$exists": true, "$nin": values })
    }

    fn where_is_null(self, field: &str) -> Self {
        self.clause(field, doc! { "$type": "null" })
    }

    /// A field already used as a sort key keeps its first direction and position.
    fn order_by(mut self, field: &str, descending: bool) -> Self {
        if !self.sort.contains_key(field) {
            self.sort.insert(field, if descending { -1 } else { 1 });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfacade_core::query::{FilterSpec, OrderSpec, apply_filters_and_order, apply_order};

    #[test]
    fn test_single_filter_is_unwrapped() {
        let query = MongoQuery::new("users").where_equal_to("name", Bson::from("Ann"));

        assert_eq!(query.filter(), doc! { "name": { "$eq": "Ann" } });
        assert_eq!(query.sort(), None);
    }

    #[test]
    fn test_filters_and_order_translate() {
        let query = apply_filters_and_order(
            MongoQuery::new("users"),
            &[FilterSpec::gte("age", 18), FilterSpec::array_contains("tags", "admin")],
            &[OrderSpec::desc("age"), OrderSpec::asc("name")],
        )
        .unwrap();

        assert_eq!(
            query.filter(),
            doc! {
                "$and": [
                    { "age": { "$gte": 18 } },
                    { "tags": { "$elemMatch": { "$eq": "admin" } } },
                ]
            }
        );
        assert_eq!(query.sort(), Some(doc! { "age": -1, "name": 1 }));
    }

    #[test]
    fn test_repeated_sort_field_keeps_first_key() {
        let query = apply_order(
            MongoQuery::new("users"),
            &[OrderSpec::asc("age"), OrderSpec::desc("name"), OrderSpec::desc("age")],
        );

        assert_eq!(query.sort(), Some(doc! { "age": 1, "name": -1 }));
    }

    #[test]
    fn test_negated_operators_require_field() {
        let query = MongoQuery::new("users").where_not_in("role", vec![Bson::from("guest")]);

        assert_eq!(
            query.filter(),
            doc! { "role": { "$exists": true, "$nin": ["guest"] } }
        );
    }
}
