//! Convenient re-exports of commonly used types from docrepo.
//!
//! ```ignore
//! use docrepo::prelude::*;
//! ```
//!
//! This provides access to:
//! - Document traits and identifiers
//! - Backends and their builders
//! - Contexts, factories and repositories
//! - Registries for collections and codecs
//! - Error types

pub use bson::oid::ObjectId;
pub use docrepo_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::Collection,
    context::DbContext,
    document::{Document, DocumentExt, DocumentKind},
    error::{DocumentStoreError, DocumentStoreResult},
    factory::{DbContextBuilder, DbContextFactory},
    index::{IndexFactory, IndexOrder, IndexSpec},
    registry::{CollectionDescriptor, CollectionProvider, CollectionRegistry, DocumentLineage},
    repository::{BaseRepository, Repository},
    serializer::{DocumentCodec, SerdeCodec, SerializerRegistry},
};
