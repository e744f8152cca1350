//! Storage backend abstraction for the document context.
//!
//! This module defines the trait that abstracts over the physical document store
//! (in-memory, MongoDB, ...). A backend is bound to a single database name and exposes
//! collection-scoped primitives keyed by [`ObjectId`]: identifier lookup, identifier
//! membership lookup, writes that report affected-document counts, collection
//! provisioning and session acquisition.
//!
//! # Examples
//!
//! ```ignore
//! use docrepo::backend::StoreBackend;
//! use bson::{oid::ObjectId, Bson, doc};
//!
//! let backend = MyBackendImpl::new("app");
//!
//! let id = ObjectId::new();
//! let doc = Bson::Document(doc! { "_id": id, "name": "Alice" });
//! let inserted = backend.insert_documents(vec![(id, doc)], "users").await?;
//! assert_eq!(inserted, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, oid::ObjectId};
use std::fmt::Debug;

use crate::{error::DocumentStoreResult, index::IndexSpec};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Single-document writes are expected to be atomic; multi-document writes
/// need not be.
///
/// # Counts
///
/// Mutating operations return the number of documents the backend actually affected.
/// Callers compare these counts against what they expected; the backend itself never
/// fails because a targeted document was missing.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Handle returned by [`StoreBackend::start_session`].
    type Session: Send;

    /// Name of the database this backend is bound to.
    fn database_name(&self) -> &str;

    /// Counts all documents in a collection. A missing collection counts as empty.
    async fn count_documents(&self, collection: &str) -> DocumentStoreResult<u64>;

    /// Returns every document of a collection.
    async fn find_all(&self, collection: &str) -> DocumentStoreResult<Vec<Bson>>;

    /// Returns the documents whose id is contained in `ids`. Missing ids are omitted and
    /// result order is not guaranteed to match `ids`.
    async fn find_by_ids(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Returns the document with the given id, if any.
    async fn find_one(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<Option<Bson>>;

    /// Inserts new documents, returning how many were inserted.
    ///
    /// Inserting an id that already exists is an error.
    async fn insert_documents(
        &self,
        documents: Vec<(ObjectId, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;

    /// Replaces the document with the given id, returning the modified count.
    ///
    /// The count is `0` when no document matched, and also when the stored document was
    /// already identical to the replacement.
    async fn replace_document(
        &self,
        id: ObjectId,
        document: Bson,
        collection: &str,
    ) -> DocumentStoreResult<u64>;

    /// Deletes the document with the given id, returning the deleted count (0 or 1).
    async fn delete_document(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<u64>;

    /// Deletes every document whose id is contained in `ids`, returning the deleted count.
    async fn delete_documents(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;

    /// Lists the names of all collections in the database.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Creates an empty collection.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Drops a collection and all its documents. Dropping a missing collection succeeds.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Creates an index on a collection.
    async fn create_index(&self, collection: &str, index: IndexSpec) -> DocumentStoreResult<()>;

    /// Starts a session that callers may use to scope several operations in a
    /// transaction. Isolation and retry semantics belong to the backend.
    async fn start_session(&self) -> DocumentStoreResult<Self::Session>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op, but backends with external connections
    /// should override this.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    type Session = B::Session;

    fn database_name(&self) -> &str {
        (*self).database_name()
    }

    async fn count_documents(&self, collection: &str) -> DocumentStoreResult<u64> {
        (*self).count_documents(collection).await
    }

    async fn find_all(&self, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        (*self).find_all(collection).await
    }

    async fn find_by_ids(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        (*self).find_by_ids(ids, collection).await
    }

    async fn find_one(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        (*self).find_one(id, collection).await
    }

    async fn insert_documents(
        &self,
        documents: Vec<(ObjectId, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        (*self)
            .insert_documents(documents, collection)
            .await
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Bson,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        (*self)
            .replace_document(id, document, collection)
            .await
    }

    async fn delete_document(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<u64> {
        (*self).delete_document(id, collection).await
    }

    async fn delete_documents(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        (*self).delete_documents(ids, collection).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        (*self).list_collections().await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).drop_collection(name).await
    }

    async fn create_index(&self, collection: &str, index: IndexSpec) -> DocumentStoreResult<()> {
        (*self).create_index(collection, index).await
    }

    async fn start_session(&self) -> DocumentStoreResult<Self::Session> {
        (*self).start_session().await
    }
}

/// Factory trait for creating backend instances asynchronously.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
