//! Construction of [`DbContext`]s with a per-database uniqueness guard.
//!
//! A [`DbContextFactory`] remembers every database name it has built a context for.
//! Asking it for a second context on the same name fails before the backend is touched.
//! Clones of a factory share the same set of names, so one factory (or its clones)
//! should be used for the whole application.

use parking_lot::Mutex;
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, warn};

use crate::{
    backend::StoreBackend,
    context::DbContext,
    error::{DocumentStoreError, DocumentStoreResult},
    registry::{CollectionProvider, CollectionRegistry, CollectionRegistryBuilder},
    serializer::SerializerRegistry,
};

#[derive(Debug, Clone, Default)]
pub struct DbContextFactory {
    initialized: Arc<Mutex<BTreeSet<String>>>,
}

impl DbContextFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a context over `backend`.
    pub fn builder<B: StoreBackend + 'static>(&self, backend: B) -> DbContextBuilder<B> {
        DbContextBuilder {
            factory: self.clone(),
            backend,
            collections: CollectionRegistry::builder(),
            registry: None,
            serializers: SerializerRegistry::new(),
        }
    }

    pub fn is_initialized(&self, database: &str) -> bool {
        self.initialized.lock().contains(database)
    }

    /// Database names served so far, sorted.
    pub fn initialized_databases(&self) -> Vec<String> {
        self.initialized.lock().iter().cloned().collect()
    }

    fn claim(&self, database: &str) -> DocumentStoreResult<()> {
        if !self.initialized.lock().insert(database.to_string()) {
            warn!(database, "context already initialized for database");
            return Err(DocumentStoreError::DatabaseAlreadyInitialized(database.to_string()));
        }

        Ok(())
    }
}

/// Builder returned by [`DbContextFactory::builder`].
pub struct DbContextBuilder<B: StoreBackend> {
    factory: DbContextFactory,
    backend: B,
    collections: CollectionRegistryBuilder,
    registry: Option<CollectionRegistry>,
    serializers: SerializerRegistry,
}

impl<B: StoreBackend + 'static> DbContextBuilder<B> {
    /// Adds every descriptor and lineage declaration `provider` supplies.
    pub fn collections<P: CollectionProvider + ?Sized>(mut self, provider: &P) -> Self {
        for descriptor in provider.descriptors() {
            self.collections = self.collections.descriptor(descriptor);
        }
        for lineage in provider.lineage() {
            self.collections = self.collections.with_lineage(lineage);
        }
        self
    }

    /// Uses an already built registry. Descriptors added through
    /// [`DbContextBuilder::collections`] are ignored when this is set.
    pub fn registry(mut self, registry: CollectionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Installs custom codecs.
    pub fn serializers(mut self, serializers: SerializerRegistry) -> Self {
        self.serializers = serializers;
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::Configuration`] for an invalid collection registry.
    /// - [`DocumentStoreError::DatabaseAlreadyInitialized`] if the factory already built a
    ///   context for the backend's database name.
    pub fn build(self) -> DocumentStoreResult<DbContext<B>> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => self.collections.build()?,
        };

        self.factory.claim(self.backend.database_name())?;
        debug!(
            database = self.backend.database_name(),
            collections = registry.descriptors().len(),
            serializers = self.serializers.len(),
            "context initialized"
        );

        Ok(DbContext::new(self.backend, registry, self.serializers))
    }
}
