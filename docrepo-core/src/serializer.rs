//! Custom encode/decode strategies per document type.
//!
//! By default documents travel through serde (see [`DocumentExt`]). A
//! [`SerializerRegistry`] overrides that for individual types. The registry is handed to
//! the context builder by value, so every registration necessarily happens before the
//! context that uses it exists.

use bson::Bson;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    document::{Document, DocumentExt, DocumentKind},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Encode/decode strategy for one document type.
pub trait DocumentCodec<T>: Send + Sync {
    fn encode(&self, document: &T) -> DocumentStoreResult<Bson>;

    fn decode(&self, bson: Bson) -> DocumentStoreResult<T>;
}

/// The serde-backed codec used when nothing is registered for a type.
pub struct SerdeCodec<T>(PhantomData<fn() -> T>);

impl<T> Default for SerdeCodec<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Document> DocumentCodec<T> for SerdeCodec<T> {
    fn encode(&self, document: &T) -> DocumentStoreResult<Bson> {
        document.to_bson()
    }

    fn decode(&self, bson: Bson) -> DocumentStoreResult<T> {
        T::from_bson(bson)
    }
}

/// Shared handle to a codec for `T`.
pub type CodecRef<T> = Arc<dyn DocumentCodec<T>>;

/// Registry of codecs keyed by document type.
#[derive(Default)]
pub struct SerializerRegistry {
    // values are `CodecRef<T>` for the keyed type
    codecs: HashMap<TypeId, (DocumentKind, Arc<dyn Any + Send + Sync>)>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`] if `T` already has a codec.
    pub fn register<T, C>(mut self, codec: C) -> DocumentStoreResult<Self>
    where
        T: Document,
        C: DocumentCodec<T> + 'static,
    {
        let kind = DocumentKind::of::<T>();

        if self.codecs.contains_key(&kind.type_id()) {
            return Err(DocumentStoreError::Configuration(format!(
                "serializer for {kind} already registered"
            )));
        }

        let codec: CodecRef<T> = Arc::new(codec);
        self.codecs.insert(kind.type_id(), (kind, Arc::new(codec)));

        Ok(self)
    }

    pub fn contains<T: Document>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Codec for `T`, falling back to [`SerdeCodec`].
    pub fn codec<T: Document>(&self) -> CodecRef<T> {
        self.codecs
            .get(&TypeId::of::<T>())
            .and_then(|(_, codec)| codec.downcast_ref::<CodecRef<T>>())
            .cloned()
            .unwrap_or_else(|| Arc::new(SerdeCodec::<T>::default()))
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.codecs.values().map(|(kind, _)| kind))
            .finish()
    }
}
