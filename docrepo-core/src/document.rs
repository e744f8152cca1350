//! Core traits and types for document representation and serialization.
//!
//! This module provides the trait every stored entity implements, the [`DocumentKind`]
//! type tag used to key registries and caches, and utilities for converting documents
//! between BSON and JSON.

use bson::{Bson, deserialize_from_bson, oid::ObjectId, serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, to_value};
use std::{
    any::{TypeId, type_name},
    fmt,
};

use crate::error::DocumentStoreResult;

/// Core trait that all documents stored through a context must implement.
///
/// A document exposes a single [`ObjectId`] identifier. The identifier should be
/// serialized under `_id` so that backends filter on their native key.
///
/// # Example
///
/// ```ignore
/// use docrepo::document::Document;
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     #[serde(rename = "_id")]
///     pub id: ObjectId,
///     pub name: String,
/// }
///
/// impl Document for User {
///     fn id(&self) -> &ObjectId {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &ObjectId;

    /// Replaces this document's identifier. Called on insert when the document
    /// still carries the empty identifier.
    fn set_id(&mut self, id: ObjectId);
}

/// Extension trait providing serialization/deserialization utilities for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;

    /// Converts this document to a JSON value.
    fn to_json(&self) -> DocumentStoreResult<Value>;

    /// Creates a document from a JSON value.
    fn from_json(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DocumentStoreResult<Self> {
        Ok(from_value(value)?)
    }
}

/// Type tag identifying a document type without runtime reflection.
///
/// Two kinds are equal iff they were built from the same Rust type. The name is the
/// type's path with the module prefix stripped and is only used for messages.
#[derive(Clone, Copy)]
pub struct DocumentKind {
    type_id: TypeId,
    name: &'static str,
}

impl DocumentKind {
    /// Returns the kind of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name(type_name::<T>()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short type name, e.g. `User` for `my_app::model::User`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DocumentKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for DocumentKind {}

impl std::hash::Hash for DocumentKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Strips the module path while leaving generic arguments intact:
// `a::b::Wrapper<c::D>` becomes `Wrapper<c::D>`. Names that do not start with a path,
// such as tuples or arrays, are kept whole.
fn short_type_name(full: &'static str) -> &'static str {
    if !full.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return full;
    }

    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id")]
        id: ObjectId,
        body: String,
    }

    impl Document for Note {
        fn id(&self) -> &ObjectId {
            &self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = id;
        }
    }

    struct Wrapper<T>(T);

    #[test]
    fn kind_name_drops_module_path() {
        assert_eq!(DocumentKind::of::<Note>().name(), "Note");
        assert_eq!(DocumentKind::of::<Wrapper<Note>>().name(), "Wrapper<docrepo_core::document::tests::Note>");
        assert_eq!(DocumentKind::of::<u32>().name(), "u32");
    }

    #[test]
    fn kind_name_keeps_compound_types_whole() {
        assert_eq!(
            DocumentKind::of::<(Note, u32)>().name(),
            std::any::type_name::<(Note, u32)>()
        );
        assert_eq!(
            DocumentKind::of::<[Note; 2]>().name(),
            std::any::type_name::<[Note; 2]>()
        );
    }

    #[test]
    fn kinds_compare_by_type() {
        assert_eq!(DocumentKind::of::<Note>(), DocumentKind::of::<Note>());
        assert_ne!(DocumentKind::of::<Note>(), DocumentKind::of::<Wrapper<Note>>());
    }

    #[test]
    fn bson_conversion_keeps_id_under_underscore_id() {
        let note = Note { id: ObjectId::new(), body: "hello".into() };
        let bson = note.to_bson().unwrap();

        assert_eq!(bson.as_document().unwrap().get_object_id("_id").unwrap(), note.id);
        assert_eq!(Note::from_bson(bson).unwrap(), note);
    }

    #[test]
    fn json_conversion() {
        let note = Note { id: ObjectId::new(), body: "hello".into() };
        let json = note.to_json().unwrap();

        assert_eq!(json["body"], "hello");
        assert_eq!(Note::from_json(json).unwrap(), note);
    }
}
