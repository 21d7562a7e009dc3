//! Conversion of raw backend records into typed domain values.
//!
//! Every record read through the facade passes through [`to_domain`]: the record identifier is
//! injected under the reserved `id` key, then the caller's deserializer runs on the result.
//! Deserializer failures surface as [`ErrorKind::DeserializationFailure`](crate::error::ErrorKind)
//! errors carrying the record's path.

use bson::{Bson, Document, de::deserialize_from_document};
use serde::de::DeserializeOwned;
use std::fmt::Display;

use crate::{
    backend::RawRecord,
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Reserved key under which record identifiers are injected.
pub const ID_KEY: &str = "id";

/// Returns `data` with `id` set to `id`, replacing any value already stored there.
pub fn with_id(mut data: Document, id: &str) -> Document {
    data.insert(ID_KEY, Bson::String(id.to_string()));
    data
}

/// Injects `id` into `data` and runs `deserializer` on the result.
///
/// `path` is the collection path the record was read from.
pub fn to_domain<T, E, F>(data: Document, id: &str, path: &str, deserializer: &F) -> DocumentStoreResult<T>
where
    F: Fn(Document) -> Result<T, E>,
    E: Display,
{
    deserializer(with_id(data, id)).map_err(|err| DocumentStoreError::deserialization(path, id, err))
}

/// Maps each record independently, keeping the backend's order.
///
/// Stops at the first record the deserializer rejects.
pub fn map_records<T, E, F>(
    records: Vec<RawRecord>,
    path: &str,
    deserializer: &F,
) -> DocumentStoreResult<Vec<T>>
where
    F: Fn(Document) -> Result<T, E>,
    E: Display,
{
    records
        .into_iter()
        .map(|record| to_domain(record.data, &record.id, path, deserializer))
        .collect()
}

/// Serde-backed deserializer usable with every read operation.
///
/// ```ignore
/// let user: User = store.get_by_id("users", "abc", &from_record).await?;
/// ```
pub fn from_record<T: DeserializeOwned>(record: Document) -> Result<T, bson::error::Error> {
    deserialize_from_document(record)
}

/// Identity deserializer returning the mapping itself.
pub fn raw(record: Document) -> Result<Document, std::convert::Infallible> {
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    use crate::error::ErrorKind;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        id: String,
        name: String,
    }

    #[test]
    fn test_id_is_injected() {
        let mapped = to_domain(doc! { "name": "Ada" }, "X", "people", &raw).unwrap();
        assert_eq!(mapped.get_str("id").unwrap(), "X");
        assert_eq!(mapped.get_str("name").unwrap(), "Ada");
    }

    #[test]
    fn test_injected_id_overrides_stored_id() {
        let mapped = to_domain(doc! { "id": "Y", "name": "Ada" }, "X", "people", &raw).unwrap();
        assert_eq!(mapped.get_str("id").unwrap(), "X");
    }

    #[test]
    fn test_serde_deserializer() {
        let person: Person = to_domain(doc! { "name": "Ada" }, "p1", "people", &from_record).unwrap();
        assert_eq!(person, Person { id: "p1".to_string(), name: "Ada".to_string() });
    }

    #[test]
    fn test_deserializer_failure_is_classified() {
        let error = to_domain::<Person, _, _>(doc! { "age": 3 }, "p1", "people", &from_record)
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::DeserializationFailure);
        assert_eq!(error.path.as_deref(), Some("people"));
        assert!(error.message.contains("people/p1"));
        assert!(error.cause.is_some());
    }

    #[test]
    fn test_map_records_keeps_order() {
        let records = vec![
            RawRecord::new("b", doc! { "name": "Bea" }),
            RawRecord::new("a", doc! { "name": "Ada" }),
        ];

        let people: Vec<Person> = map_records(records, "people", &from_record).unwrap();
        let ids = people.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_custom_deserializer_errors() {
        let reject = |_: Document| -> Result<Person, String> { Err("nope".to_string()) };

        let error = map_records(vec![RawRecord::new("a", doc! {})], "people", &reject).unwrap_err();
        assert_eq!(error.kind, ErrorKind::DeserializationFailure);
        assert_eq!(error.cause.as_deref(), Some("nope"));
    }
}
