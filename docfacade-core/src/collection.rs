//! Typed collection handles.
//!
//! [`TypedCollection`] binds a [`DocumentStore`] to the collection of one [`Document`] type, so
//! reads deserialize through serde and writes take the typed value.
//!
//! # Example
//!
//! ```ignore
//! let users = store.typed_collection::<User>();
//!
//! let alice = users.add(&User { id: String::new(), name: "Alice".into() }).await?;
//! let same = users.get(&alice.id).await?;
//! let active = users.where_matching(&[FilterSpec::eq("active", true)]).await?;
//! ```

use std::marker::PhantomData;

use crate::{
    backend::DocumentBackend,
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    query::{FilterSpec, OrderSpec},
    store::DocumentStore,
};

#[derive(Debug)]
pub struct TypedCollection<'a, B: DocumentBackend, D: Document> {
    path: String,
    store: &'a DocumentStore<B>,
    _marker: PhantomData<D>,
}

impl<'a, B: DocumentBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(path: String, store: &'a DocumentStore<B>) -> Self {
        Self { path, store, _marker: PhantomData }
    }

    /// Returns the path of this collection.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn get(&self, id: &str) -> DocumentStoreResult<D> {
        self.store.get_by_id(&self.path, id, D::from_record).await
    }

    pub async fn all(&self) -> DocumentStoreResult<Vec<D>> {
        self.store.fetch_all(&self.path, D::from_record).await
    }

    pub async fn where_matching(&self, filters: &[FilterSpec]) -> DocumentStoreResult<Vec<D>> {
        self.store
            .where_matching(&self.path, filters, D::from_record)
            .await
    }

    pub async fn order_by(&self, orders: &[OrderSpec]) -> DocumentStoreResult<Vec<D>> {
        self.store
            .order_by(&self.path, orders, D::from_record)
            .await
    }

    pub async fn where_and_order_by(
        &self,
        filters: &[FilterSpec],
        orders: &[OrderSpec],
    ) -> DocumentStoreResult<Vec<D>> {
        self.store
            .where_and_order_by(&self.path, filters, orders, D::from_record)
            .await
    }

    /// Merges the fields of `document` into the stored document `id`.
    pub async fn update(&self, id: &str, document: &D) -> DocumentStoreResult<()> {
        self.store
            .update(&self.path, id, document.to_record()?)
            .await
    }

    /// Replaces the stored document `id` with `document`.
    pub async fn set(&self, id: &str, document: &D) -> DocumentStoreResult<()> {
        self.store
            .set(&self.path, id, document.to_record()?)
            .await
    }

    /// Stores `document` under a new identifier and returns it with that identifier set.
    pub async fn add(&self, document: &D) -> DocumentStoreResult<D> {
        self.store
            .add(&self.path, document.to_record()?, D::from_record)
            .await
    }

    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        self.store.delete(&self.path, id).await
    }

    /// Deletes every document in this collection.
    pub async fn clear(&self) -> DocumentStoreResult<()> {
        self.store.delete_collection(&self.path).await
    }
}
