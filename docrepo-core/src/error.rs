//! Error types and result types for repository and context operations.
//!
//! Two errors carry domain meaning: [`DocumentStoreError::ResourceNotFound`] for a
//! lookup that required a result, and [`DocumentStoreError::MutationCountMismatch`]
//! for a write whose affected-document count diverged from what was expected.
//! Every other variant is a plain configuration, validation or backend failure.
//!
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with a document context
/// or repository.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// A lookup that must yield a document found nothing.
    #[error("The resource {resource} with the id {id} was not found")]
    ResourceNotFound {
        /// Short name of the document type that was searched.
        resource: String,
        /// The identifier that was searched for, as given by the caller.
        id: String,
    },
    /// A mutation affected a different number of documents than expected.
    #[error("Db was not modified. Expected changes {expected}, actual {actual} in {operation}")]
    MutationCountMismatch {
        /// The count reported by the backend.
        actual: u64,
        /// The count the operation required.
        expected: u64,
        /// Name of the repository operation that performed the mutation.
        operation: &'static str,
    },
    /// A string could not be parsed as a document identifier.
    #[error("Invalid document id {0:?}")]
    InvalidId(String),
    /// No collection is registered for the document type or any of its ancestors.
    #[error("Collection of type {0} not found")]
    CollectionNotRegistered(String),
    /// A context for this database name was already built by the same factory.
    #[error("Context for database {0} already initialized")]
    DatabaseAlreadyInitialized(String),
    /// Invalid registry, serializer or builder setup.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DocumentStoreError {
    /// Builds a [`DocumentStoreError::MutationCountMismatch`].
    pub fn count_mismatch(actual: u64, expected: u64, operation: &'static str) -> Self {
        DocumentStoreError::MutationCountMismatch { actual, expected, operation }
    }

    /// Builds a [`DocumentStoreError::ResourceNotFound`].
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        DocumentStoreError::ResourceNotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
