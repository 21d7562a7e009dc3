//! In-memory document backend for docfacade.
//!
//! This crate provides a thread-safe, in-memory implementation of the `DocumentBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development,
//! tests, and small deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Schemaless storage** - Documents are kept as BSON mappings keyed by identifier
//! - **Full operator support** - Every filter operator and multi-key ordering
//! - **Fault injection** - Make a collection fail with a chosen backend code
//!
//! # Quick Start
//!
//! ```ignore
//! use docfacade::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().build().await?;
//!     let store = DocumentStore::new(backend);
//!
//!     let user: bson::Document = store
//!         .add("users", doc! { "name": "Alice" }, docfacade::mapper::raw)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docfacade_memory;

mod evaluator;
pub mod query;
pub mod store;

pub use query::MemoryQuery;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
