//! In-memory document storage backend for docrepo.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development
//! and testing.
//!
//! # Quick Start
//!
//! ```ignore
//! use docrepo::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().database("app").build().await?;
//!     let ctx = DbContextFactory::new()
//!         .builder(backend)
//!         .collections(&vec![CollectionDescriptor::of::<User>("users")])
//!         .build()?;
//!
//!     ctx.create_collections().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrepo_memory;

pub mod store;

pub use store::{InMemorySession, InMemoryStore, InMemoryStoreBuilder};
