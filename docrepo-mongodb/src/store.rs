use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, ClientSession, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, IndexOptions},
};
use tracing::debug;
use docrepo_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
};

fn backend_error(e: mongodb::error::Error) -> DocumentStoreError {
    DocumentStoreError::Backend(e.to_string())
}

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    // The stored `_id` always mirrors the identifier the caller keyed the write with.
    fn prepare_document(&self, id: &ObjectId, document: Bson) -> DocumentStoreResult<Document> {
        let mut document = match document {
            Bson::Document(document) => document,
            other => {
                return Err(DocumentStoreError::Serialization(format!(
                    "Expected document, got {:?}",
                    other.element_type()
                )));
            }
        };
        document.insert("_id", *id);

        Ok(document)
    }

    async fn find_where(&self, filter: Document, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        Ok(
            self.get_collection(collection)
                .find(filter)
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    type Session = ClientSession;

    fn database_name(&self) -> &str {
        &self.database
    }

    async fn count_documents(&self, collection: &str) -> DocumentStoreResult<u64> {
        self.get_collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(backend_error)
    }

    async fn find_all(&self, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        self.find_where(doc! {}, collection).await
    }

    async fn find_by_ids(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        self.find_where(doc! { "_id": { "$in": ids } }, collection).await
    }

    async fn find_one(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        Ok(
            self.get_collection(collection)
                .find_one(doc! { "_id": id })
                .await
                .map_err(backend_error)?
                .map(Bson::Document)
        )
    }

    async fn insert_documents(&self, documents: Vec<(ObjectId, Bson)>, collection: &str) -> DocumentStoreResult<u64> {
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self.get_collection(collection)
            .insert_many(
                documents
                    .into_iter()
                    .map(|(id, doc)| self.prepare_document(&id, doc))
                    .collect::<DocumentStoreResult<Vec<Document>>>()?,
            )
            .await
            .map_err(backend_error)?;

        Ok(result.inserted_ids.len() as u64)
    }

    async fn replace_document(&self, id: ObjectId, document: Bson, collection: &str) -> DocumentStoreResult<u64> {
        let result = self.get_collection(collection)
            .replace_one(doc! { "_id": id }, self.prepare_document(&id, document)?)
            .await
            .map_err(backend_error)?;

        Ok(result.modified_count)
    }

    async fn delete_document(&self, id: ObjectId, collection: &str) -> DocumentStoreResult<u64> {
        let result = self.get_collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(backend_error)?;

        Ok(result.deleted_count)
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<u64> {
        let result = self.get_collection(collection)
            .delete_many(doc! { "_id": { "$in": ids } })
            .await
            .map_err(backend_error)?;

        Ok(result.deleted_count)
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(backend_error)
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.client
            .database(&self.database)
            .create_collection(name)
            .await
            .map_err(backend_error)
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(backend_error)
    }

    async fn create_index(&self, collection: &str, index: IndexSpec) -> DocumentStoreResult<()> {
        let keys = index
            .keys
            .iter()
            .map(|(field, order)| (field.clone(), Bson::Int32(order.direction())))
            .collect::<Document>();

        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                    .unique(index.unique)
                    .name(index.index_name())
                    .build()
                )
                .build()
            )
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn start_session(&self) -> DocumentStoreResult<Self::Session> {
        self.client
            .start_session()
            .await
            .map_err(backend_error)
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        debug!(database = %self.database, "shutting down mongodb client");
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        if self.database.is_empty() {
            return Err(DocumentStoreError::Initialization("database name must not be empty".into()));
        }

        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
