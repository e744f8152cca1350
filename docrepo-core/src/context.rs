//! The single entry point to a backend for one database.
//!
//! A [`DbContext`] owns the backend, resolves collection names through its
//! [`CollectionRegistry`], caches one [`Collection`] handle per document type and exposes
//! provisioning and session acquisition. Contexts are built through a
//! [`DbContextFactory`](crate::factory::DbContextFactory), which refuses to build a second
//! context for a database name it has already served.
//!
//! # Example
//!
//! ```ignore
//! let factory = DbContextFactory::new();
//! let ctx = factory
//!     .builder(InMemoryStore::builder().database("app").build().await?)
//!     .collections(&vec![CollectionDescriptor::of::<User>("users")])
//!     .build()?;
//!
//! ctx.create_collections().await?;
//! let users = ctx.collection::<User>()?;
//! ```

use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};
use tracing::debug;

use crate::{
    backend::StoreBackend,
    collection::Collection,
    document::{Document, DocumentKind},
    error::{DocumentStoreError, DocumentStoreResult},
    index::{IndexFactory, IndexSpec},
    registry::CollectionRegistry,
    serializer::SerializerRegistry,
};

type HandleCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

pub struct DbContext<B: StoreBackend> {
    backend: Arc<B>,
    registry: CollectionRegistry,
    serializers: SerializerRegistry,
    // values are `Collection<B, T>` for the keyed `T`
    handles: RwLock<HandleCache>,
}

impl<B: StoreBackend> fmt::Debug for DbContext<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContext")
            .field("database", &self.backend.database_name())
            .field("registry", &self.registry)
            .field("serializers", &self.serializers)
            .field("cached_handles", &self.handles.read().len())
            .finish()
    }
}

impl<B: StoreBackend + 'static> DbContext<B> {
    pub(crate) fn new(backend: B, registry: CollectionRegistry, serializers: SerializerRegistry) -> Self {
        Self {
            backend: Arc::new(backend),
            registry,
            serializers,
            handles: RwLock::new(HandleCache::new()),
        }
    }

    pub fn database_name(&self) -> &str {
        self.backend.database_name()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Kinds with a directly registered collection.
    pub fn collection_kinds(&self) -> Vec<DocumentKind> {
        self.registry.document_kinds()
    }

    /// Registered collection names, in registration order.
    pub fn collection_names(&self) -> Vec<&str> {
        self.registry.collection_names()
    }

    /// Resolved collection name for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::CollectionNotRegistered`] if neither `T` nor any of
    /// its declared ancestors has a collection.
    pub fn collection_name<T: Document>(&self) -> DocumentStoreResult<&str> {
        self.registry.resolve_type::<T>()
    }

    /// Returns the collection handle for `T`, creating and caching it on first access.
    ///
    /// Every later call for the same `T` returns a clone of the cached handle.
    pub fn collection<T: Document>(&self) -> DocumentStoreResult<Collection<B, T>> {
        let key = TypeId::of::<T>();

        if let Some(handle) = self
            .handles
            .read()
            .get(&key)
            .and_then(|h| h.downcast_ref::<Collection<B, T>>())
        {
            return Ok(handle.clone());
        }

        let name = self.collection_name::<T>()?;
        let created = Collection::new(
            Arc::from(name),
            Arc::clone(&self.backend),
            self.serializers.codec::<T>(),
        );

        // A concurrent first access may have filled the slot meanwhile; keep that one.
        let mut handles = self.handles.write();
        let entry = handles.entry(key).or_insert_with(|| {
            debug!(
                database = self.backend.database_name(),
                document = DocumentKind::of::<T>().name(),
                collection = name,
                "cached collection handle"
            );
            Arc::new(created)
        });

        entry
            .downcast_ref::<Collection<B, T>>()
            .cloned()
            .ok_or_else(|| DocumentStoreError::CollectionNotRegistered(DocumentKind::of::<T>().name().to_string()))
    }

    /// Reports whether the collection for `T` physically exists in the backend.
    pub async fn check_collection_exists<T: Document>(&self) -> DocumentStoreResult<bool> {
        let name = self.collection_name::<T>()?;

        Ok(self
            .backend
            .list_collections()
            .await?
            .iter()
            .any(|existing| existing == name))
    }

    /// Drops the collection for `T`.
    pub async fn delete_collection<T: Document>(&self) -> DocumentStoreResult<()> {
        let name = self.collection_name::<T>()?;

        debug!(database = self.database_name(), collection = name, "dropping collection");
        self.backend.drop_collection(name).await
    }

    /// Creates every registered collection the backend does not have yet.
    pub async fn create_collections(&self) -> DocumentStoreResult<()> {
        let existing = self
            .backend
            .list_collections()
            .await?
            .into_iter()
            .collect::<HashSet<_>>();

        for name in self.registry.distinct_collection_names() {
            if existing.contains(name) {
                continue;
            }

            debug!(database = self.database_name(), collection = name, "creating collection");
            self.backend.create_collection(name).await?;
        }

        Ok(())
    }

    /// Lets `factory` create its indices against this context.
    pub async fn create_indices<F>(&self, factory: &F) -> DocumentStoreResult<()>
    where
        F: IndexFactory<B> + ?Sized,
    {
        factory.create_indices(self).await
    }

    /// Creates one index on the collection for `T`.
    pub async fn create_index<T: Document>(&self, index: IndexSpec) -> DocumentStoreResult<()> {
        let collection = self.collection::<T>()?;

        debug!(
            database = self.database_name(),
            collection = collection.name(),
            index = %index.index_name(),
            "creating index"
        );
        collection.create_index(index).await
    }

    /// Starts a backend session for transactional scopes.
    pub async fn start_transaction_session(&self) -> DocumentStoreResult<B::Session> {
        self.backend.start_session().await
    }

    /// Blocking variant of [`DbContext::start_transaction_session`].
    ///
    /// Drives the backend future to completion on the current thread, so it must not be
    /// called from inside an async task.
    ///
    /// Backends whose futures depend on a tokio reactor, such as the MongoDB driver, still
    /// need one to be reachable: call this from a thread where a tokio handle is entered,
    /// e.g. inside `tokio::task::spawn_blocking`.
    pub fn start_transaction_session_sync(&self) -> DocumentStoreResult<B::Session> {
        futures::executor::block_on(self.backend.start_session())
    }

    /// Shuts down the backend.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Backend`] if collection handles obtained from this
    /// context are still alive elsewhere.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        let Self { backend, handles, .. } = self;
        drop(handles);

        match Arc::try_unwrap(backend) {
            Ok(backend) => backend.shutdown().await,
            Err(_) => Err(DocumentStoreError::Backend(
                "backend is still referenced by live collection handles".to_string(),
            )),
        }
    }
}
