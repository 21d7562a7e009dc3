//! A typed query and mutation facade over schemaless document stores.
//!
//! This crate is the entry point of the docfacade project. It re-exports the core types from
//! the sub-crates and gives access to the bundled backends.
//!
//! # Features
//!
//! - **Declarative queries** - Filters and sort keys as plain values, folded into native queries
//! - **Caller-owned deserialization** - Every read takes a deserializer; records arrive with `id` injected
//! - **Normalized errors** - One error type with a closed set of kinds, whatever the backend
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docfacade::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(default)]
//!     pub id: String,
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! impl Document for User {
//!     fn collection_path() -> &'static str { "users" }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//!     // Raw access: path, payload and deserializer per call
//!     let alice: User = store
//!         .add("users", bson::doc! { "name": "Alice", "age": 33 }, from_record::<User>)
//!         .await?;
//!
//!     // Typed access through the document's own collection
//!     let users = store.typed_collection::<User>();
//!     let adults = users
//!         .where_and_order_by(&[FilterSpec::gte("age", 18)], &[OrderSpec::asc("name")])
//!         .await?;
//!
//!     match users.get("missing").await {
//!         Err(err) if err.is_not_found() => println!("no such user"),
//!         other => println!("{other:?}"),
//!     }
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use docfacade_core::{backend, collection, config, document, error, mapper, query, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend.
pub mod memory {
    pub use docfacade_memory::{InMemoryStore, InMemoryStoreBuilder, MemoryQuery};
}

/// MongoDB storage backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docfacade_mongodb::{MongoDbStore, MongoDbStoreBuilder, MongoQuery};
}
