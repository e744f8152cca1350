//! Mapping of document types to collection names.
//!
//! A [`CollectionRegistry`] is built once at startup from [`CollectionDescriptor`]s and
//! optional [`DocumentLineage`] declarations. Resolution tries the type itself first,
//! then walks its declared parents until one has a descriptor, so several document
//! variants can share the collection declared for a common base type.
//!
//! # Example
//!
//! ```ignore
//! let registry = CollectionRegistry::builder()
//!     .register::<Animal>("animals")
//!     .extends::<Dog, Animal>()
//!     .extends::<Puppy, Dog>()
//!     .build()?;
//!
//! assert_eq!(registry.resolve_type::<Puppy>()?, "animals");
//! ```

use std::collections::{HashMap, HashSet};

use crate::{
    document::DocumentKind,
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Pairs a document type with the name of the collection that stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub kind: DocumentKind,
    pub collection_name: String,
}

impl CollectionDescriptor {
    pub fn of<T: 'static>(collection_name: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::of::<T>(),
            collection_name: collection_name.into(),
        }
    }
}

/// Declares that `kind` extends `parent` for the purpose of collection resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLineage {
    pub kind: DocumentKind,
    pub parent: DocumentKind,
}

impl DocumentLineage {
    pub fn of<T: 'static, P: 'static>() -> Self {
        Self {
            kind: DocumentKind::of::<T>(),
            parent: DocumentKind::of::<P>(),
        }
    }
}

/// Supplies the full set of descriptors when a context is built.
pub trait CollectionProvider {
    fn descriptors(&self) -> Vec<CollectionDescriptor>;

    fn lineage(&self) -> Vec<DocumentLineage> {
        Vec::new()
    }
}

impl CollectionProvider for Vec<CollectionDescriptor> {
    fn descriptors(&self) -> Vec<CollectionDescriptor> {
        self.clone()
    }
}

impl CollectionProvider for [CollectionDescriptor] {
    fn descriptors(&self) -> Vec<CollectionDescriptor> {
        self.to_vec()
    }
}

/// Resolves document types to collection names.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    descriptors: Vec<CollectionDescriptor>,
    by_kind: HashMap<DocumentKind, usize>,
    parents: HashMap<DocumentKind, DocumentKind>,
}

impl CollectionRegistry {
    pub fn builder() -> CollectionRegistryBuilder {
        CollectionRegistryBuilder::default()
    }

    /// Builds a registry from everything `provider` supplies.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`] if a type is described twice or is
    /// given two different parents.
    pub fn from_provider<P: CollectionProvider + ?Sized>(provider: &P) -> DocumentStoreResult<Self> {
        let mut registry = Self::default();

        for descriptor in provider.descriptors() {
            registry.insert_descriptor(descriptor)?;
        }
        for lineage in provider.lineage() {
            registry.insert_lineage(lineage)?;
        }

        Ok(registry)
    }

    fn insert_descriptor(&mut self, descriptor: CollectionDescriptor) -> DocumentStoreResult<()> {
        if self.by_kind.contains_key(&descriptor.kind) {
            return Err(DocumentStoreError::Configuration(format!(
                "collection for {} registered more than once",
                descriptor.kind
            )));
        }

        self.by_kind.insert(descriptor.kind, self.descriptors.len());
        self.descriptors.push(descriptor);

        Ok(())
    }

    fn insert_lineage(&mut self, lineage: DocumentLineage) -> DocumentStoreResult<()> {
        match self.parents.get(&lineage.kind) {
            Some(parent) if *parent != lineage.parent => Err(DocumentStoreError::Configuration(format!(
                "{} cannot extend both {} and {}",
                lineage.kind, parent, lineage.parent
            ))),
            _ => {
                self.parents.insert(lineage.kind, lineage.parent);
                Ok(())
            }
        }
    }

    /// Resolves the collection name for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::CollectionNotRegistered`] if neither `kind` nor any
    /// of its ancestors has a descriptor.
    pub fn resolve(&self, kind: DocumentKind) -> DocumentStoreResult<&str> {
        let mut visited = HashSet::new();
        let mut current = Some(kind);

        while let Some(candidate) = current {
            if !visited.insert(candidate) {
                break;
            }
            if let Some(&index) = self.by_kind.get(&candidate) {
                return Ok(&self.descriptors[index].collection_name);
            }
            current = self.parents.get(&candidate).copied();
        }

        Err(DocumentStoreError::CollectionNotRegistered(kind.name().to_string()))
    }

    pub fn resolve_type<T: 'static>(&self) -> DocumentStoreResult<&str> {
        self.resolve(DocumentKind::of::<T>())
    }

    /// Registered collection names in registration order, duplicates included.
    pub fn collection_names(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(|d| d.collection_name.as_str())
            .collect()
    }

    /// Registered collection names in registration order, each once.
    pub fn distinct_collection_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.collection_names()
            .into_iter()
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Kinds that have a direct descriptor, in registration order.
    pub fn document_kinds(&self) -> Vec<DocumentKind> {
        self.descriptors.iter().map(|d| d.kind).collect()
    }

    pub fn descriptors(&self) -> &[CollectionDescriptor] {
        &self.descriptors
    }
}

/// Builder collecting descriptors and lineage declarations.
#[derive(Debug, Default)]
pub struct CollectionRegistryBuilder {
    descriptors: Vec<CollectionDescriptor>,
    lineage: Vec<DocumentLineage>,
}

impl CollectionRegistryBuilder {
    /// Stores `T` in `collection_name`.
    pub fn register<T: 'static>(mut self, collection_name: impl Into<String>) -> Self {
        self.descriptors.push(CollectionDescriptor::of::<T>(collection_name));
        self
    }

    pub fn descriptor(mut self, descriptor: CollectionDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn with_lineage(mut self, lineage: DocumentLineage) -> Self {
        self.lineage.push(lineage);
        self
    }

    /// Declares `T` a subtype of `P`.
    pub fn extends<T: 'static, P: 'static>(mut self) -> Self {
        self.lineage.push(DocumentLineage::of::<T, P>());
        self
    }

    pub fn build(self) -> DocumentStoreResult<CollectionRegistry> {
        CollectionRegistry::from_provider(&self)
    }
}

impl CollectionProvider for CollectionRegistryBuilder {
    fn descriptors(&self) -> Vec<CollectionDescriptor> {
        self.descriptors.clone()
    }

    fn lineage(&self) -> Vec<DocumentLineage> {
        self.lineage.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Animal;
    struct Dog;
    struct Puppy;
    struct Cat;
    struct Rock;
    struct Loop1;
    struct Loop2;

    fn registry() -> CollectionRegistry {
        CollectionRegistry::builder()
            .register::<Animal>("animals")
            .register::<Cat>("cats")
            .extends::<Dog, Animal>()
            .extends::<Puppy, Dog>()
            .extends::<Cat, Animal>()
            .build()
            .unwrap()
    }

    #[test]
    fn exact_match_wins_over_ancestor() {
        assert_eq!(registry().resolve_type::<Cat>().unwrap(), "cats");
        assert_eq!(registry().resolve_type::<Animal>().unwrap(), "animals");
    }

    #[test]
    fn subtypes_fall_back_through_ancestors() {
        assert_eq!(registry().resolve_type::<Dog>().unwrap(), "animals");
        assert_eq!(registry().resolve_type::<Puppy>().unwrap(), "animals");
    }

    #[test]
    fn unregistered_chain_fails_with_type_name() {
        match registry().resolve_type::<Rock>() {
            Err(DocumentStoreError::CollectionNotRegistered(name)) => assert_eq!(name, "Rock"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn lineage_cycle_terminates() {
        let registry = CollectionRegistry::builder()
            .register::<Animal>("animals")
            .extends::<Loop1, Loop2>()
            .extends::<Loop2, Loop1>()
            .build()
            .unwrap();

        assert!(matches!(
            registry.resolve_type::<Loop1>(),
            Err(DocumentStoreError::CollectionNotRegistered(_))
        ));
    }

    #[test]
    fn duplicate_descriptor_is_rejected() {
        let result = CollectionRegistry::builder()
            .register::<Animal>("animals")
            .register::<Animal>("beasts")
            .build();

        assert!(matches!(result, Err(DocumentStoreError::Configuration(_))));
    }

    #[test]
    fn conflicting_parent_is_rejected() {
        let result = CollectionRegistry::builder()
            .extends::<Puppy, Dog>()
            .extends::<Puppy, Animal>()
            .build();

        assert!(matches!(result, Err(DocumentStoreError::Configuration(_))));
    }

    #[test]
    fn distinct_names_keep_registration_order() {
        let registry = CollectionRegistry::builder()
            .register::<Dog>("pets")
            .register::<Cat>("pets")
            .register::<Rock>("rocks")
            .build()
            .unwrap();

        assert_eq!(registry.collection_names(), vec!["pets", "pets", "rocks"]);
        assert_eq!(registry.distinct_collection_names(), vec!["pets", "rocks"]);
        assert_eq!(
            registry.document_kinds(),
            vec![DocumentKind::of::<Dog>(), DocumentKind::of::<Cat>(), DocumentKind::of::<Rock>()]
        );
    }

    #[test]
    fn vec_of_descriptors_is_a_provider() {
        let provider = vec![CollectionDescriptor::of::<Dog>("dogs")];
        let registry = CollectionRegistry::from_provider(&provider).unwrap();

        assert_eq!(registry.resolve_type::<Dog>().unwrap(), "dogs");
    }
}
