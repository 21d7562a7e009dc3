//! In-memory storage implementation for the document store facade.
//!
//! Collections are ordered maps from identifier to BSON document, held behind async-safe
//! read-write locks.

use async_trait::async_trait;
use bson::Document;
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use uuid::Uuid;

use docfacade_core::{
    backend::{
        BackendError, BackendResult, DocumentBackend, DocumentBackendBuilder, NativeQuery, RawRecord,
    },
    error::document_path,
};

use crate::{evaluator::DocumentEvaluator, query::MemoryQuery};

type CollectionMap = BTreeMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;
type FaultMap = HashMap<String, BackendError>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones share the
/// same underlying data. Records are listed in identifier order.
///
/// Queries scan the whole collection. Semantics follow common document-store rules:
/// ordering predicates only compare values of the same type, `not-equal`/`not-in` and sort
/// keys skip documents missing the field, and `is-null` requires an explicit null.
///
/// # Example
///
/// ```ignore
/// use docfacade_memory::InMemoryStore;
/// use docfacade::backend::DocumentBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.add_document("users", doc! { "name": "Alice", "age": 30 }).await?;
/// let record = store.get_document("users", &id).await?;
/// assert!(record.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection path -> (document id -> document)
    store: Arc<RwLock<StoreMap>>,
    /// collection path -> failure returned by every operation on it
    faults: Arc<RwLock<FaultMap>>,
    /// document path -> failure returned when deleting that document
    delete_faults: Arc<RwLock<FaultMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            faults: Arc::new(RwLock::new(FaultMap::new())),
            delete_faults: Arc::new(RwLock::new(FaultMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Makes every subsequent operation on `path` fail with `code`.
    pub async fn inject_fault(&self, path: &str, code: &str) {
        self.faults.write().await.insert(
            path.to_string(),
            BackendError::new(code, format!("injected fault on {path}")),
        );
    }

    /// Makes deleting the document `path/id` fail with `code`. Other operations are unaffected.
    pub async fn inject_delete_fault(&self, path: &str, id: &str, code: &str) {
        let target = document_path(path, id);
        let fault = BackendError::new(code, format!("injected fault on delete of {target}"));

        self.delete_faults.write().await.insert(target, fault);
    }

    /// Removes every fault injected for `path` and its documents.
    pub async fn clear_fault(&self, path: &str) {
        self.faults.write().await.remove(path);

        let prefix = document_path(path, "");
        self.delete_faults
            .write()
            .await
            .retain(|target, _| !target.starts_with(&prefix));
    }

    /// Number of documents currently stored at `path`.
    pub async fn document_count(&self, path: &str) -> usize {
        self.store
            .read()
            .await
            .get(path)
            .map_or(0, BTreeMap::len)
    }

    async fn check_fault(&self, path: &str) -> BackendResult<()> {
        match self.faults.read().await.get(path) {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn records<'a>(documents: impl IntoIterator<Item = (&'a String, &'a Document)>) -> Vec<RawRecord> {
        documents
            .into_iter()
            .map(|(id, data)| RawRecord::new(id.clone(), data.clone()))
            .collect()
    }
}

#[async_trait]
impl DocumentBackend for InMemoryStore {
    type Query = MemoryQuery;

    fn collection_query(&self, path: &str) -> Self::Query {
        MemoryQuery::new(path)
    }

    async fn get_document(&self, path: &str, id: &str) -> BackendResult<Option<RawRecord>> {
        self.check_fault(path).await?;

        Ok(self
            .store
            .read()
            .await
            .get(path)
            .and_then(|collection| collection.get(id))
            .map(|data| RawRecord::new(id, data.clone())))
    }

    async fn list_documents(&self, path: &str) -> BackendResult<Vec<RawRecord>> {
        self.check_fault(path).await?;

        Ok(self
            .store
            .read()
            .await
            .get(path)
            .map(|collection| Self::records(collection.iter()))
            .unwrap_or_default())
    }

    async fn run_query(&self, query: Self::Query) -> BackendResult<Vec<RawRecord>> {
        self.check_fault(query.path()).await?;

        let store = self.store.read().await;
        let collection = match store.get(query.path()) {
            Some(collection) => collection,
            None => return Ok(vec![]),
        };

        let mut matched = collection
            .iter()
            .filter(|(_, data)| {
                let evaluator = DocumentEvaluator::new(data);
                evaluator.matches_all(query.predicates()) && evaluator.has_sort_fields(query.sort())
            })
            .collect::<Vec<_>>();

        if !query.sort().is_empty() {
            // stable: ties keep identifier order
            matched.sort_by(|(_, a), (_, b)| DocumentEvaluator::compare_by(a, b, query.sort()));
        }

        Ok(Self::records(matched))
    }

    async fn update_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()> {
        self.check_fault(path).await?;

        let mut store = self.store.write().await;
        let existing = store
            .get_mut(path)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| BackendError::new("not-found", format!("no document {id} in {path}")))?;

        for (key, value) in data {
            existing.insert(key, value);
        }

        Ok(())
    }

    async fn set_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()> {
        self.check_fault(path).await?;

        self.store
            .write()
            .await
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string(), data);

        Ok(())
    }

    async fn add_document(&self, path: &str, data: Document) -> BackendResult<String> {
        self.check_fault(path).await?;

        let id = Uuid::new_v4().simple().to_string();

        self.store
            .write()
            .await
            .entry(path.to_string())
            .or_default()
            .insert(id.clone(), data);

        tracing::trace!(path, id = id.as_str(), "stored new document");

        Ok(id)
    }

    async fn delete_document(&self, path: &str, id: &str) -> BackendResult<()> {
        self.check_fault(path).await?;

        if let Some(fault) = self.delete_faults.read().await.get(&document_path(path, id)) {
            return Err(fault.clone());
        }

        if let Some(collection) = self.store.write().await.get_mut(path) {
            collection.remove(id);
        }

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances, optionally pre-seeded.
///
/// ```ignore
/// let store = InMemoryStore::builder()
///     .with_document("users", "alice", doc! { "name": "Alice" })
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: StoreMap,
}

impl InMemoryStoreBuilder {
    pub fn with_document(mut self, path: &str, id: &str, data: Document) -> Self {
        self.seed
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string(), data);
        self
    }
}

#[async_trait]
impl DocumentBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> BackendResult<Self::Backend> {
        Ok(InMemoryStore {
            store: Arc::new(RwLock::new(self.seed)),
            ..InMemoryStore::default()
        })
    }
}
