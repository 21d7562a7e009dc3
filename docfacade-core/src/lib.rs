//! A typed query and mutation facade over schemaless document stores.
//!
//! This crate is the core of the docfacade project and provides:
//!
//! - **Backend abstraction** ([`backend`]) - Traits a document store client implements
//! - **Query specifications** ([`query`]) - Declarative filters and sort keys, folded into native queries
//! - **Result mapping** ([`mapper`]) - Identifier injection and caller-supplied deserialization
//! - **Error handling** ([`error`]) - A closed error taxonomy and the backend code translator
//! - **Store facade** ([`store`]) - The public CRUD and query surface
//! - **Typed documents** ([`document`], [`collection`]) - Serde types bound to their collection
//! - **Configuration** ([`config`]) - Facade tunables
//!
//! # Example
//!
//! ```ignore
//! use docfacade::{store::DocumentStore, query::FilterSpec, mapper::from_record};
//! use bson::doc;
//!
//! let store = DocumentStore::new(backend);
//!
//! let user: User = store.add("users", doc! { "name": "Alice" }, from_record::<User>).await?;
//! let again: User = store.get_by_id("users", &user.id, from_record::<User>).await?;
//! let named: Vec<User> = store
//!     .where_matching("users", &[FilterSpec::eq("name", "Alice")], from_record::<User>)
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docfacade_core;

pub mod backend;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod mapper;
pub mod query;
pub mod store;
