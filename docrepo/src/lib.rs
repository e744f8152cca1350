//! Typed repositories over a document database.
//!
//! This crate is the primary entry point for users of docrepo. It re-exports the core
//! types from `docrepo-core` and gives access to the storage backends.
//!
//! # Features
//!
//! - **One context per database** - A [`factory::DbContextFactory`] refuses to build a
//!   second context for a database it already serves
//! - **Type-to-collection mapping** - Document types map to collections up front, and
//!   declared subtypes share the collection of their nearest registered ancestor
//! - **Generic repositories** - [`repository::BaseRepository`] gives every document type
//!   the same CRUD verbs, with writes checked against the backend's affected counts
//! - **Pluggable codecs and indices** - Per-type serializers and application-defined
//!   index factories
//!
//! # Quick Start
//!
//! ```ignore
//! use docrepo::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id")]
//!     pub id: ObjectId,
//!     pub name: String,
//! }
//!
//! impl Document for User {
//!     fn id(&self) -> &ObjectId { &self.id }
//!     fn set_id(&mut self, id: ObjectId) { self.id = id; }
//! }
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let factory = DbContextFactory::new();
//!     let ctx = Arc::new(
//!         factory
//!             .builder(InMemoryStore::builder().database("app").build().await?)
//!             .collections(&vec![CollectionDescriptor::of::<User>("users")])
//!             .build()?,
//!     );
//!     ctx.create_collections().await?;
//!
//!     let users = BaseRepository::<_, User>::new(Arc::clone(&ctx));
//!     let mut alice = User { id: users.empty_id(), name: "Alice".to_string() };
//!
//!     // Empty ids are filled in on insert
//!     users.insert_one(&mut alice).await?;
//!
//!     let stored = users.get_single_or_throw(&alice.id.to_hex()).await?;
//!     println!("Stored user: {:?}", stored);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use docrepo_core::{
    backend, collection, context, document, error, factory, id, index, registry, repository, serializer,
};

// Re-export BSON types and the trait macro used by `IndexFactory` implementations
pub use async_trait::async_trait;
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docrepo_memory::{InMemorySession, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docrepo_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
