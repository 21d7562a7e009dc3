//! The store facade: typed reads and raw-mapping writes against a [`DocumentBackend`].
//!
//! Every operation funnels backend failures through [`translate`] and every record it reads
//! through the result mapper, so callers only ever see a [`DocumentStoreError`] or values
//! produced by their own deserializer.
//!
//! # Example
//!
//! ```ignore
//! use docfacade::{store::DocumentStore, query::{FilterSpec, OrderSpec}, mapper::from_record};
//!
//! let store = DocumentStore::new(backend);
//!
//! let adults: Vec<User> = store
//!     .where_and_order_by(
//!         "users",
//!         &[FilterSpec::gte("age", 18)],
//!         &[OrderSpec::asc("name")],
//!         from_record,
//!     )
//!     .await?;
//! ```

use bson::Document;
use futures::stream::{self, StreamExt};
use std::fmt::Display;

use crate::{
    backend::{BackendResult, DocumentBackend, RawRecord},
    collection::TypedCollection,
    config::StoreConfig,
    document::Document as StoredDocument,
    error::{DocumentStoreError, DocumentStoreResult, document_path, translate},
    mapper::{map_records, to_domain},
    query::{FilterSpec, OrderSpec, apply_filters, apply_filters_and_order, apply_order},
};

/// A document store bound to a specific backend implementation.
///
/// Calls are independent of each other; the store holds no mutable state and may be shared
/// across tasks when the backend allows it.
#[derive(Debug)]
pub struct DocumentStore<B: DocumentBackend> {
    backend: B,
    config: StoreConfig,
}

impl<B: DocumentBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend and default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Gets a typed collection for the specified document type.
    ///
    /// The collection path is determined by the document type's `collection_path()` method.
    pub fn typed_collection<'a, D: StoredDocument>(&'a self) -> TypedCollection<'a, B, D> {
        TypedCollection::new(D::collection_path().to_string(), self)
    }

    /// Reads the document `id` from the collection at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such document exists, a translated backend failure, or
    /// `DeserializationFailure` when `deserializer` rejects the record.
    pub async fn get_by_id<T, E, F>(&self, path: &str, id: &str, deserializer: F) -> DocumentStoreResult<T>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(path, id, "get document");

        let record = self
            .backend
            .get_document(path, id)
            .await
            .map_err(|err| translate(&err, path))?
            .ok_or_else(|| DocumentStoreError::not_found(path, id))?;

        to_domain(record.data, &record.id, path, &deserializer)
    }

    /// Reads every document in the collection at `path`.
    ///
    /// An empty collection yields an empty vector, not an error.
    pub async fn fetch_all<T, E, F>(&self, path: &str, deserializer: F) -> DocumentStoreResult<Vec<T>>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(path, "fetch all documents");

        let records = self
            .backend
            .list_documents(path)
            .await
            .map_err(|err| translate(&err, path))?;

        map_records(records, path, &deserializer)
    }

    /// Reads the documents at `path` matching every filter.
    ///
    /// # Errors
    ///
    /// `EmptyResult` when nothing matches, a translated backend failure, or
    /// `DeserializationFailure`.
    pub async fn where_matching<T, E, F>(
        &self,
        path: &str,
        filters: &[FilterSpec],
        deserializer: F,
    ) -> DocumentStoreResult<Vec<T>>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(path, filters = filters.len(), "query documents");

        let query = apply_filters(self.backend.collection_query(path), filters)?;
        let records = self.run_query(path, query).await?;

        map_records(records, path, &deserializer)
    }

    /// Reads the documents at `path` sorted by `orders`, first key first.
    ///
    /// Same errors as [`DocumentStore::where_matching`].
    pub async fn order_by<T, E, F>(
        &self,
        path: &str,
        orders: &[OrderSpec],
        deserializer: F,
    ) -> DocumentStoreResult<Vec<T>>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(path, orders = orders.len(), "query ordered documents");

        let query = apply_order(self.backend.collection_query(path), orders);
        let records = self.run_query(path, query).await?;

        map_records(records, path, &deserializer)
    }

    /// Filters, then sorts, the documents at `path`.
    ///
    /// Index compatibility between filtered and sorted fields is left to the backend.
    pub async fn where_and_order_by<T, E, F>(
        &self,
        path: &str,
        filters: &[FilterSpec],
        orders: &[OrderSpec],
        deserializer: F,
    ) -> DocumentStoreResult<Vec<T>>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(
            path,
            filters = filters.len(),
            orders = orders.len(),
            "query filtered and ordered documents"
        );

        let query = apply_filters_and_order(self.backend.collection_query(path), filters, orders)?;
        let records = self.run_query(path, query).await?;

        map_records(records, path, &deserializer)
    }

    /// Merges `data` into the existing document `id`.
    pub async fn update(&self, path: &str, id: &str, data: Document) -> DocumentStoreResult<()> {
        tracing::debug!(path, id, "update document");

        self.backend
            .update_document(path, id, data)
            .await
            .map_err(|err| translate(&err, path))
    }

    /// Replaces the document `id` with `data`, creating it if needed.
    pub async fn set(&self, path: &str, id: &str, data: Document) -> DocumentStoreResult<()> {
        tracing::debug!(path, id, "set document");

        self.backend
            .set_document(path, id, data)
            .await
            .map_err(|err| translate(&err, path))
    }

    /// Creates a document with a backend-assigned identifier.
    ///
    /// Returns `data` with the new identifier injected, passed through `deserializer`.
    pub async fn add<T, E, F>(&self, path: &str, data: Document, deserializer: F) -> DocumentStoreResult<T>
    where
        F: Fn(Document) -> Result<T, E>,
        E: Display,
    {
        tracing::debug!(path, "add document");

        let id = self
            .backend
            .add_document(path, data.clone())
            .await
            .map_err(|err| translate(&err, path))?;

        tracing::debug!(path = %document_path(path, &id), "document added");

        to_domain(data, &id, path, &deserializer)
    }

    pub async fn delete(&self, path: &str, id: &str) -> DocumentStoreResult<()> {
        tracing::debug!(path, id, "delete document");

        self.backend
            .delete_document(path, id)
            .await
            .map_err(|err| translate(&err, path))
    }

    /// Deletes every document visible in one listing of the collection at `path`.
    ///
    /// Deletes run concurrently (at most `delete_concurrency` at a time). Every delete runs to
    /// completion even after one fails; the first failure in completion order is then returned.
    /// Nothing is rolled back.
    pub async fn delete_collection(&self, path: &str) -> DocumentStoreResult<()> {
        let records = self
            .backend
            .list_documents(path)
            .await
            .map_err(|err| translate(&err, path))?;

        tracing::debug!(path, documents = records.len(), "delete collection");

        let backend = &self.backend;

        let results = stream::iter(records)
            .map(|record| async move { backend.delete_document(path, &record.id).await })
            .buffer_unordered(self.config.delete_concurrency.max(1))
            .collect::<Vec<BackendResult<()>>>()
            .await;

        results
            .into_iter()
            .collect::<BackendResult<Vec<()>>>()
            .map(|_| ())
            .map_err(|err| translate(&err, path))
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend
            .shutdown()
            .await
            .map_err(|err| translate(&err, "/"))
    }

    async fn run_query(&self, path: &str, query: B::Query) -> DocumentStoreResult<Vec<RawRecord>> {
        let records = self
            .backend
            .run_query(query)
            .await
            .map_err(|err| translate(&err, path))?;

        if records.is_empty() {
            return Err(DocumentStoreError::empty_result(path));
        }

        Ok(records)
    }
}
