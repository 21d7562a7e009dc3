//! MongoDB backend implementation for docfacade.
//!
//! This crate provides a MongoDB-based implementation of the `DocumentBackend` trait. Filters
//! and sort keys are translated into MongoDB filter and sort documents and executed by the
//! server.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docfacade = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! Driver failures are mapped onto the canonical backend codes (`unauthenticated`,
//! `permission-denied`, `already-exists`, `unavailable`, ...) so the facade's error translator
//! classifies them like any other backend's.
//!
//! # Example
//!
//! ```ignore
//! use docfacade::{backend::DocumentBackendBuilder, mongodb::MongoDbStore, store::DocumentStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let store = DocumentStore::new(backend);
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docfacade_mongodb;

pub mod query;
pub mod store;

pub use query::MongoQuery;
pub use store::{MongoDbStore, MongoDbStoreBuilder};
