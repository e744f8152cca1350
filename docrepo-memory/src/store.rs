//! In-memory storage implementation for document contexts.
//!
//! This module provides a simple in-memory backend that stores documents as BSON values
//! in HashMaps behind async-safe read-write locks.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, oid::ObjectId};
use tracing::debug;

use docrepo_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
};

type CollectionMap = HashMap<ObjectId, Bson>;
type StoreMap = HashMap<String, CollectionMap>;
type IndexMap = HashMap<String, Vec<IndexSpec>>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state, so clones share
/// the same data. Writes report counts the way MongoDB does: a replace that leaves the
/// stored document unchanged reports zero modified documents.
///
/// Indices are recorded but not enforced.
///
/// # Example
///
/// ```ignore
/// use docrepo_memory::InMemoryStore;
/// use docrepo::backend::StoreBackend;
/// use bson::{oid::ObjectId, Bson, doc};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new("app");
///
///     let id = ObjectId::new();
///     let doc = Bson::Document(doc! { "_id": id, "name": "Alice" });
///     store.insert_documents(vec![(id, doc)], "users").await?;
///
///     assert_eq!(store.count_documents("users").await?, 1);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    database: Arc<str>,
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
    /// collection_name -> indices created on it
    indexes: Arc<RwLock<IndexMap>>,
    sessions: Arc<AtomicU64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(InMemoryStoreBuilder::DEFAULT_DATABASE)
    }
}

impl InMemoryStore {
    /// Creates a new empty in-memory store for `database`.
    pub fn new(database: &str) -> Self {
        Self {
            database: Arc::from(database),
            store: Arc::new(RwLock::new(StoreMap::new())),
            indexes: Arc::new(RwLock::new(IndexMap::new())),
            sessions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = InMemoryStore::builder().database("app").build().await.unwrap();
    /// ```
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Indices created on `collection`, in creation order.
    pub async fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.indexes
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

/// Handle returned by [`InMemoryStore::start_session`].
///
/// The in-memory store has no transactions; a session only carries an id that is unique
/// per store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemorySession {
    pub id: u64,
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    type Session = InMemorySession;

    fn database_name(&self) -> &str {
        &self.database
    }

    async fn count_documents(&self, collection: &str) -> DocumentStoreResult<u64> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .map_or(0, |col| col.len() as u64))
    }

    async fn find_all(&self, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .map(|col| col.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_ids(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut seen = HashSet::with_capacity(ids.len());
        let mut documents = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Some(doc) = collection_map.get(&id) {
                documents.push(doc.clone());
            }
        }

        Ok(documents)
    }

    async fn find_one(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .and_then(|col| col.get(&id))
            .cloned())
    }

    async fn insert_documents(&self, documents: Vec<(ObjectId, Bson)>, collection: &str) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        // Check the whole batch first so a failed insert leaves nothing behind.
        let mut batch = HashSet::with_capacity(documents.len());

        for (id, _) in &documents {
            if !batch.insert(*id) || collection_map.contains_key(id) {
                return Err(DocumentStoreError::DocumentAlreadyExists(id.to_hex(), collection.to_string()));
            }
        }

        let inserted = documents.len() as u64;
        collection_map.extend(documents);

        Ok(inserted)
    }

    async fn replace_document(&self, id: ObjectId, document: Bson, collection: &str) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let stored = match store.get_mut(collection).and_then(|col| col.get_mut(&id)) {
            Some(stored) => stored,
            None => return Ok(0),
        };

        if *stored == document {
            return Ok(0);
        }

        *stored = document;

        Ok(1)
    }

    async fn delete_document(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<u64> {
        Ok(self
            .store
            .write()
            .await
            .get_mut(collection)
            .and_then(|col| col.remove(&id))
            .map_or(0, |_| 1))
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let collection_map = match store.get_mut(collection) {
            Some(col) => col,
            None => return Ok(0),
        };

        Ok(ids
            .iter()
            .filter(|id| collection_map.remove(*id).is_some())
            .count() as u64)
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store.write().await.remove(name);
        self.indexes.write().await.remove(name);

        Ok(())
    }

    async fn create_index(&self, collection: &str, index: IndexSpec) -> DocumentStoreResult<()> {
        let mut indexes = self.indexes.write().await;
        let existing = indexes.entry(collection.to_string()).or_default();

        if existing.iter().any(|known| known.index_name() == index.index_name()) {
            return Ok(());
        }

        debug!(collection, index = %index.index_name(), "recording in-memory index");
        existing.push(index);

        Ok(())
    }

    async fn start_session(&self) -> DocumentStoreResult<InMemorySession> {
        Ok(InMemorySession {
            id: self.sessions.fetch_add(1, Ordering::Relaxed) + 1,
        })
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use docrepo_memory::InMemoryStore;
/// use docrepo::backend::StoreBackendBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::builder().database("app").build().await.unwrap();
/// }
/// ```
pub struct InMemoryStoreBuilder {
    database: String,
}

impl InMemoryStoreBuilder {
    pub const DEFAULT_DATABASE: &'static str = "default";

    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }
}

impl Default for InMemoryStoreBuilder {
    fn default() -> Self {
        Self {
            database: Self::DEFAULT_DATABASE.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// Fails with [`DocumentStoreError::Initialization`] if the database name is empty.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        if self.database.is_empty() {
            return Err(DocumentStoreError::Initialization("database name must not be empty".to_string()));
        }

        Ok(InMemoryStore::new(&self.database))
    }
}
