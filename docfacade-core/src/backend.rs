//! Storage backend abstraction for the document store.
//!
//! The facade never talks to a store client directly. It talks to a [`DocumentBackend`],
//! which resolves collection paths, reads and writes single records, and executes
//! backend-native queries. Queries are [`NativeQuery`] values: immutable, refined one
//! predicate or sort key at a time, each refinement returning a new query.
//!
//! Backends report failures as [`BackendError`] (a string code plus context). They are never
//! shown to callers as-is; the facade runs them through [`crate::error::translate`].
//!
//! # Example
//!
//! ```ignore
//! use docfacade::backend::{DocumentBackend, NativeQuery};
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = backend.add_document("users", doc! { "name": "Alice", "age": 30 }).await?;
//! let query = backend
//!     .collection_query("users")
//!     .where_greater_than("age", 18.into())
//!     .order_by("name", false);
//! let records = backend.run_query(query).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;
use thiserror::Error;

/// A failure reported by the backend: a backend-specific string code plus context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct BackendError {
    pub code: String,
    pub message: String,
    pub stack: Option<String>,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A record as returned by the backend.
///
/// `data` never carries the identifier; it lives beside it in `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub data: Document,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self { id: id.into(), data }
    }
}

/// A backend-native query.
///
/// There is exactly one refinement method per [`crate::query::Operator`] member, plus one for
/// sort keys. Each consumes the query and returns a more constrained one; predicates and sort
/// keys keep the order in which they were applied.
pub trait NativeQuery: Sized + Clone + Send + Sync + Debug {
    /// The collection path this query targets.
    fn path(&self) -> &str;

    fn where_equal_to(self, field: &str, value: Bson) -> Self;
    fn where_not_equal_to(self, field: &str, value: Bson) -> Self;
    fn where_less_than(self, field: &str, value: Bson) -> Self;
    fn where_less_than_or_equal_to(self, field: &str, value: Bson) -> Self;
    fn where_greater_than(self, field: &str, value: Bson) -> Self;
    fn where_greater_than_or_equal_to(self, field: &str, value: Bson) -> Self;
    fn where_array_contains(self, field: &str, value: Bson) -> Self;
    fn where_array_contains_any(self, field: &str, values: Vec<Bson>) -> Self;
    fn where_in(self, field: &str, values: Vec<Bson>) -> Self;
    fn where_not_in(self, field: &str, values: Vec<Bson>) -> Self;
    fn where_is_null(self, field: &str) -> Self;

    /// Adds a sort key. Earlier keys take precedence over later ones.
    fn order_by(self, field: &str, descending: bool) -> Self;
}

/// Abstract interface for document store clients.
///
/// Implementations are assumed to be connected and authenticated already. Transport concerns
/// (retries, pooling, timeouts) belong to the implementation.
///
/// # Thread Safety
///
/// All implementations must be thread-safe; the facade issues independent calls concurrently
/// and shares no state between them.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    type Query: NativeQuery;

    /// Returns an unconstrained query over the collection at `path`.
    fn collection_query(&self, path: &str) -> Self::Query;

    /// Reads one record. `Ok(None)` when no document exists at `path/id`.
    async fn get_document(&self, path: &str, id: &str) -> BackendResult<Option<RawRecord>>;

    /// Lists every record in the collection, in the backend's natural order.
    async fn list_documents(&self, path: &str) -> BackendResult<Vec<RawRecord>>;

    /// Executes a query built from [`DocumentBackend::collection_query`].
    async fn run_query(&self, query: Self::Query) -> BackendResult<Vec<RawRecord>>;

    /// Merges `data` into an existing document. Fails with `not-found` if it doesn't exist.
    async fn update_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()>;

    /// Replaces (or creates) the document at `path/id` with `data`.
    async fn set_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()>;

    /// Creates a document with a backend-assigned identifier and returns that identifier.
    async fn add_document(&self, path: &str, data: Document) -> BackendResult<String>;

    /// Deletes the document at `path/id`. Deleting a missing document succeeds.
    async fn delete_document(&self, path: &str, id: &str) -> BackendResult<()>;

    /// Releases backend resources. The default implementation is a no-op.
    async fn shutdown(self) -> BackendResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> DocumentBackend for &B
where
    B: DocumentBackend,
{
    type Query = B::Query;

    fn collection_query(&self, path: &str) -> Self::Query {
        (*self).collection_query(path)
    }

    async fn get_document(&self, path: &str, id: &str) -> BackendResult<Option<RawRecord>> {
        (*self).get_document(path, id).await
    }

    async fn list_documents(&self, path: &str) -> BackendResult<Vec<RawRecord>> {
        (*self).list_documents(path).await
    }

    async fn run_query(&self, query: Self::Query) -> BackendResult<Vec<RawRecord>> {
        (*self).run_query(query).await
    }

    async fn update_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()> {
        (*self).update_document(path, id, data).await
    }

    async fn set_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()> {
        (*self).set_document(path, id, data).await
    }

    async fn add_document(&self, path: &str, data: Document) -> BackendResult<String> {
        (*self).add_document(path, data).await
    }

    async fn delete_document(&self, path: &str, id: &str) -> BackendResult<()> {
        (*self).delete_document(path, id).await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait DocumentBackendBuilder {
    type Backend: DocumentBackend;

    async fn build(self) -> BackendResult<Self::Backend>;
}
