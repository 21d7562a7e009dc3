//! Typed documents that know their own collection.
//!
//! Implementing [`Document`] for a serde type lets it be used with
//! [`TypedCollection`](crate::collection::TypedCollection), which picks the collection path and
//! the (de)serializer automatically.
//!
//! # Example
//!
//! ```ignore
//! use docfacade::document::Document;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(default)]
//!     pub id: String,
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! impl Document for User {
//!     fn collection_path() -> &'static str {
//!         "users"
//!     }
//! }
//! ```

use bson::ser::serialize_to_document;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    mapper::{ID_KEY, from_record},
};

/// A serde type stored in a fixed collection.
///
/// The identifier is not part of the stored mapping: it is injected under `id` on read and
/// stripped from write payloads.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the path of the collection this document belongs to.
    fn collection_path() -> &'static str;
}

/// Record conversions for [`Document`] types. Implemented for every `Document`.
pub trait DocumentExt: Document {
    /// Serializes this document into a write payload, without the `id` key.
    ///
    /// # Errors
    ///
    /// Returns an `invalid-argument` error if the value does not serialize to a mapping.
    fn to_record(&self) -> DocumentStoreResult<bson::Document>;

    /// Deserializes a record (with `id` injected) into this document type.
    fn from_record(record: bson::Document) -> Result<Self, bson::error::Error>;
}

impl<D: Document> DocumentExt for D {
    fn to_record(&self) -> DocumentStoreResult<bson::Document> {
        let mut record = serialize_to_document(self).map_err(|err| {
            DocumentStoreError::invalid_argument(
                Some(D::collection_path()),
                format!("Failed to serialize document: {err}"),
            )
        })?;
        record.remove(ID_KEY);

        Ok(record)
    }

    fn from_record(record: bson::Document) -> Result<Self, bson::error::Error> {
        from_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(default)]
        id: String,
        body: String,
    }

    impl Document for Note {
        fn collection_path() -> &'static str {
            "notes"
        }
    }

    #[test]
    fn test_to_record_strips_id() {
        let note = Note { id: "n1".to_string(), body: "hello".to_string() };
        assert_eq!(note.to_record().unwrap(), doc! { "body": "hello" });
    }

    #[test]
    fn test_from_record() {
        let note = Note::from_record(doc! { "id": "n1", "body": "hello" }).unwrap();
        assert_eq!(note, Note { id: "n1".to_string(), body: "hello".to_string() });
    }
}
