//! Typed collection handles.
//!
//! A [`Collection`] binds a backend, a resolved collection name and the codec for one
//! document type. Handles are cheap to clone and hold no state of their own; the
//! context caches one per document type.

use bson::{Bson, oid::ObjectId};
use std::{fmt, sync::Arc};

use crate::{
    backend::StoreBackend,
    document::Document,
    error::DocumentStoreResult,
    index::IndexSpec,
    serializer::CodecRef,
};

pub struct Collection<B: StoreBackend, D: Document> {
    name: Arc<str>,
    backend: Arc<B>,
    codec: CodecRef<D>,
}

impl<B: StoreBackend, D: Document> Clone for Collection<B, D> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            backend: Arc::clone(&self.backend),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<B: StoreBackend, D: Document> fmt::Debug for Collection<B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish()
    }
}

impl<B: StoreBackend, D: Document> Collection<B, D> {
    pub(crate) fn new(name: Arc<str>, backend: Arc<B>, codec: CodecRef<D>) -> Self {
        Self { name, backend, codec }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True iff both handles share the same name allocation, i.e. came from the same
    /// cache entry.
    pub fn same_handle(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }

    fn decode_all(&self, documents: Vec<Bson>) -> DocumentStoreResult<Vec<D>> {
        documents
            .into_iter()
            .map(|doc| self.codec.decode(doc))
            .collect()
    }

    pub async fn count(&self) -> DocumentStoreResult<u64> {
        self.backend.count_documents(self.name()).await
    }

    pub async fn find_all(&self) -> DocumentStoreResult<Vec<D>> {
        self.decode_all(self.backend.find_all(self.name()).await?)
    }

    pub async fn find_by_ids(&self, ids: Vec<ObjectId>) -> DocumentStoreResult<Vec<D>> {
        self.decode_all(self.backend.find_by_ids(ids, self.name()).await?)
    }

    pub async fn find_one(&self, id: ObjectId) -> DocumentStoreResult<Option<D>> {
        self.backend
            .find_one(id, self.name())
            .await?
            .map(|doc| self.codec.decode(doc))
            .transpose()
    }

    /// Inserts one document, returning the inserted count.
    pub async fn insert_one(&self, document: &D) -> DocumentStoreResult<u64> {
        self.backend
            .insert_documents(vec![(*document.id(), self.codec.encode(document)?)], self.name())
            .await
    }

    /// Inserts documents in one batch, returning the inserted count.
    pub async fn insert_many(&self, documents: &[D]) -> DocumentStoreResult<u64> {
        self.backend
            .insert_documents(
                documents
                    .iter()
                    .map(|d| {
                        self.codec
                            .encode(d)
                            .map(|b| (*d.id(), b))
                    })
                    .collect::<DocumentStoreResult<Vec<(ObjectId, Bson)>>>()?,
                self.name(),
            )
            .await
    }

    /// Replaces the stored document with the same id, returning the modified count.
    pub async fn replace_one(&self, document: &D) -> DocumentStoreResult<u64> {
        self.backend
            .replace_document(*document.id(), self.codec.encode(document)?, self.name())
            .await
    }

    pub async fn delete_one(&self, id: ObjectId) -> DocumentStoreResult<u64> {
        self.backend.delete_document(id, self.name()).await
    }

    pub async fn delete_many(&self, ids: Vec<ObjectId>) -> DocumentStoreResult<u64> {
        self.backend.delete_documents(ids, self.name()).await
    }

    pub async fn create_index(&self, index: IndexSpec) -> DocumentStoreResult<()> {
        self.backend.create_index(self.name(), index).await
    }
}
