//! Convenient re-exports of commonly used types from docfacade.
//!
//! ```ignore
//! use docfacade::prelude::*;
//! ```

pub use docfacade_core::{
    backend::{DocumentBackend, DocumentBackendBuilder, NativeQuery},
    collection::TypedCollection,
    config::StoreConfig,
    document::{Document, DocumentExt},
    error::{BackendCode, DocumentStoreError, DocumentStoreResult, ErrorKind},
    mapper::{from_record, raw},
    query::{FilterSpec, Operator, OrderSpec},
    store::DocumentStore,
};
