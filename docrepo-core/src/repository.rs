//! Generic CRUD repository keyed by document identifier.
//!
//! [`Repository`] is the contract applications program against; [`BaseRepository`] is
//! the single implementation shared by every document type. Writes verify the affected
//! count reported by the backend: a replace or delete that touched a different number of
//! documents than requested fails with
//! [`DocumentStoreError::MutationCountMismatch`]. Partial success is never reported as
//! success, but the documents that did match stay mutated.
//!
//! # Example
//!
//! ```ignore
//! let ctx = Arc::new(factory.builder(backend).collections(&provider).build()?);
//! let users = BaseRepository::<_, User>::new(Arc::clone(&ctx));
//!
//! let mut user = User { id: users.empty_id(), name: "Alice".into() };
//! users.insert_one(&mut user).await?;
//! let stored = users.get_single_or_throw(&user.id.to_hex()).await?;
//! ```

use async_trait::async_trait;
use bson::oid::ObjectId;
use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::warn;

use crate::{
    backend::StoreBackend,
    collection::Collection,
    context::DbContext,
    document::{Document, DocumentKind},
    error::{DocumentStoreError, DocumentStoreResult},
    id,
};

/// CRUD verbs and identifier helpers for one document type.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Counts all documents in the collection.
    async fn count_all(&self) -> DocumentStoreResult<u64>;

    /// Returns every document in the collection.
    async fn get_all(&self) -> DocumentStoreResult<Vec<T>>;

    /// Returns the documents whose id is among `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidId`] if any string is not an identifier.
    async fn get_all_by_ids<S>(&self, ids: &[S]) -> DocumentStoreResult<Vec<T>>
    where
        S: AsRef<str> + Sync;

    /// Returns the document with id `id`, or `None` if there is none.
    async fn get_one(&self, id: &str) -> DocumentStoreResult<Option<T>>;

    /// Returns the document with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::ResourceNotFound`] carrying the document type name
    /// and `id` if there is no such document.
    async fn get_single_or_throw(&self, id: &str) -> DocumentStoreResult<T>;

    /// Inserts `item`. An empty id is replaced by a generated one first.
    async fn insert_one(&self, item: &mut T) -> DocumentStoreResult<()>;

    /// Inserts `items` in one batch. Empty ids are replaced by generated ones first.
    async fn insert_many(&self, items: &mut [T]) -> DocumentStoreResult<()>;

    /// Replaces the stored document with the same id as `item`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::MutationCountMismatch`] unless exactly one document
    /// was modified.
    async fn replace_one(&self, item: &T) -> DocumentStoreResult<()>;

    /// Deletes `items` by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::MutationCountMismatch`] unless the deleted count
    /// equals `items.len()`.
    async fn delete_many(&self, items: &[T]) -> DocumentStoreResult<()>;

    /// Deletes the documents with the given ids. Same count rule as
    /// [`Repository::delete_many`].
    async fn delete_many_by_ids(&self, ids: &[ObjectId]) -> DocumentStoreResult<()>;

    /// Parses and deletes the documents with the given ids. Same count rule as
    /// [`Repository::delete_many`].
    async fn delete_many_by_id_strs<S>(&self, ids: &[S]) -> DocumentStoreResult<()>
    where
        S: AsRef<str> + Sync;

    /// Deletes `item` by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::MutationCountMismatch`] unless exactly one document
    /// was deleted.
    async fn delete(&self, item: &T) -> DocumentStoreResult<()>;

    /// Parses and deletes the document with id `id`. Same count rule as
    /// [`Repository::delete`].
    async fn delete_by_id(&self, id: &str) -> DocumentStoreResult<()>;

    fn is_valid_not_empty_id(&self, id: &str) -> bool {
        id::is_valid_not_empty_id(id)
    }

    fn is_not_empty_id(&self, id: &ObjectId) -> bool {
        id::is_not_empty_id(id)
    }

    fn is_empty_id(&self, id: &ObjectId) -> bool {
        id::is_empty_id(id)
    }

    fn empty_id(&self) -> ObjectId {
        id::empty_id()
    }

    fn generate_id(&self) -> ObjectId {
        id::generate_id()
    }
}

/// The shared [`Repository`] implementation. Holds nothing but the context.
pub struct BaseRepository<B: StoreBackend, T: Document> {
    ctx: Arc<DbContext<B>>,
    _marker: PhantomData<fn() -> T>,
}

impl<B: StoreBackend, T: Document> Clone for BaseRepository<B, T> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            _marker: PhantomData,
        }
    }
}

impl<B: StoreBackend + 'static, T: Document> fmt::Debug for BaseRepository<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRepository")
            .field("document", &DocumentKind::of::<T>())
            .field("database", &self.ctx.backend().database_name())
            .finish()
    }
}

impl<B: StoreBackend + 'static, T: Document> BaseRepository<B, T> {
    pub fn new(ctx: Arc<DbContext<B>>) -> Self {
        Self { ctx, _marker: PhantomData }
    }

    pub fn context(&self) -> &DbContext<B> {
        &self.ctx
    }

    fn collection(&self) -> DocumentStoreResult<Collection<B, T>> {
        self.ctx.collection::<T>()
    }

    fn assign_missing_id(item: &mut T) {
        if id::is_empty_id(item.id()) {
            item.set_id(id::generate_id());
        }
    }

    fn expect_count(
        &self,
        actual: u64,
        expected: u64,
        operation: &'static str,
    ) -> DocumentStoreResult<()> {
        if actual == expected {
            return Ok(());
        }

        warn!(
            document = DocumentKind::of::<T>().name(),
            actual, expected, operation, "mutation count mismatch"
        );
        Err(DocumentStoreError::count_mismatch(actual, expected, operation))
    }

    async fn delete_ids(&self, ids: Vec<ObjectId>, operation: &'static str) -> DocumentStoreResult<()> {
        let expected = ids.len() as u64;
        let deleted = self.collection()?.delete_many(ids).await?;

        self.expect_count(deleted, expected, operation)
    }

    async fn delete_id(&self, id: ObjectId, operation: &'static str) -> DocumentStoreResult<()> {
        let deleted = self.collection()?.delete_one(id).await?;

        self.expect_count(deleted, 1, operation)
    }
}

#[async_trait]
impl<B: StoreBackend + 'static, T: Document> Repository<T> for BaseRepository<B, T> {
    async fn count_all(&self) -> DocumentStoreResult<u64> {
        self.collection()?.count().await
    }

    async fn get_all(&self) -> DocumentStoreResult<Vec<T>> {
        self.collection()?.find_all().await
    }

    async fn get_all_by_ids<S>(&self, ids: &[S]) -> DocumentStoreResult<Vec<T>>
    where
        S: AsRef<str> + Sync,
    {
        let ids = id::parse_ids(ids)?;

        self.collection()?.find_by_ids(ids).await
    }

    async fn get_one(&self, id: &str) -> DocumentStoreResult<Option<T>> {
        let id = id::parse_id(id)?;

        self.collection()?.find_one(id).await
    }

    async fn get_single_or_throw(&self, id: &str) -> DocumentStoreResult<T> {
        self.get_one(id)
            .await?
            .ok_or_else(|| DocumentStoreError::not_found(DocumentKind::of::<T>().name(), id))
    }

    async fn insert_one(&self, item: &mut T) -> DocumentStoreResult<()> {
        Self::assign_missing_id(item);
        self.collection()?.insert_one(item).await?;

        Ok(())
    }

    async fn insert_many(&self, items: &mut [T]) -> DocumentStoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        items.iter_mut().for_each(Self::assign_missing_id);
        self.collection()?.insert_many(items).await?;

        Ok(())
    }

    async fn replace_one(&self, item: &T) -> DocumentStoreResult<()> {
        let modified = self.collection()?.replace_one(item).await?;

        self.expect_count(modified, 1, "replace_one")
    }

    async fn delete_many(&self, items: &[T]) -> DocumentStoreResult<()> {
        self.delete_ids(items.iter().map(|item| *item.id()).collect(), "delete_many")
            .await
    }

    async fn delete_many_by_ids(&self, ids: &[ObjectId]) -> DocumentStoreResult<()> {
        self.delete_ids(ids.to_vec(), "delete_many").await
    }

    async fn delete_many_by_id_strs<S>(&self, ids: &[S]) -> DocumentStoreResult<()>
    where
        S: AsRef<str> + Sync,
    {
        self.delete_ids(id::parse_ids(ids)?, "delete_many").await
    }

    async fn delete(&self, item: &T) -> DocumentStoreResult<()> {
        self.delete_id(*item.id(), "delete").await
    }

    async fn delete_by_id(&self, id: &str) -> DocumentStoreResult<()> {
        self.delete_id(id::parse_id(id)?, "delete").await
    }
}
