//! MongoDB backend implementation for docrepo.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Documents are stored under their `ObjectId` as `_id`, write counts come straight from
//! the driver's insert/replace/delete results and sessions are driver `ClientSession`s.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docrepo = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docrepo::{backend::StoreBackendBuilder, factory::DbContextFactory, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let ctx = DbContextFactory::new().builder(store).collections(&collections()).build()?;
//!
//!     ctx.create_collections().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrepo_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
