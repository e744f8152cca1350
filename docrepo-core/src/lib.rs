//! A typed repository and context layer over document databases.
//!
//! This crate is the core of the docrepo project and provides:
//!
//! - **Documents** ([`document`], [`id`]) - The document contract, type tags and identifier helpers
//! - **Store backend abstraction** ([`backend`]) - The trait storage engines implement
//! - **Collection registry** ([`registry`]) - Type to collection-name mapping with ancestor fallback
//! - **Context** ([`context`], [`factory`]) - Per-database entry point, handle cache, provisioning and sessions
//! - **Repository** ([`repository`]) - Generic CRUD verbs with affected-count verification
//! - **Collections** ([`collection`]) - Typed collection handles
//! - **Indices** ([`index`]) - Index specifications and the index factory contract
//! - **Serializers** ([`serializer`]) - Per-type custom codecs
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docrepo::prelude::*;
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id")]
//!     pub id: ObjectId,
//!     pub name: String,
//! }
//!
//! impl Document for User {
//!     fn id(&self) -> &ObjectId {
//!         &self.id
//!     }
//!
//!     fn set_id(&mut self, id: ObjectId) {
//!         self.id = id;
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrepo_core;

pub mod backend;
pub mod collection;
pub mod context;
pub mod document;
pub mod error;
pub mod factory;
pub mod id;
pub mod index;
pub mod registry;
pub mod repository;
pub mod serializer;
