//! Index creation contract.
//!
//! Which indices exist is an application concern. Applications implement
//! [`IndexFactory`] and hand it to [`DbContext::create_indices`], which passes itself
//! back so the factory can create indices on any registered collection.

use async_trait::async_trait;

use crate::{backend::StoreBackend, context::DbContext, error::DocumentStoreResult};

/// Creates the indices an application needs against a context.
///
/// # Example
///
/// ```ignore
/// struct AppIndices;
///
/// #[async_trait::async_trait]
/// impl<B: StoreBackend> IndexFactory<B> for AppIndices {
///     async fn create_indices(&self, ctx: &DbContext<B>) -> DocumentStoreResult<()> {
///         ctx.create_index::<User>(IndexSpec::ascending("email").unique()).await
///     }
/// }
/// ```
#[async_trait]
pub trait IndexFactory<B: StoreBackend>: Send + Sync {
    async fn create_indices(&self, ctx: &DbContext<B>) -> DocumentStoreResult<()>;
}

/// Sort order of an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    Ascending,
    Descending,
}

impl IndexOrder {
    /// The numeric direction used by MongoDB-style key documents.
    pub fn direction(&self) -> i32 {
        match self {
            IndexOrder::Ascending => 1,
            IndexOrder::Descending => -1,
        }
    }
}

/// Description of an index: ordered keys plus options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<(String, IndexOrder)>,
    pub unique: bool,
    pub name: Option<String>,
}

impl IndexSpec {
    /// Single-key ascending index.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, IndexOrder::Ascending)
    }

    /// Single-key descending index.
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, IndexOrder::Descending)
    }

    pub fn new(field: impl Into<String>, order: IndexOrder) -> Self {
        Self {
            keys: vec![(field.into(), order)],
            unique: false,
            name: None,
        }
    }

    /// Appends a key, making this a compound index.
    pub fn then(mut self, field: impl Into<String>, order: IndexOrder) -> Self {
        self.keys.push((field.into(), order));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Explicit name, or the `field_dir` convention joined by `_` (`email_1_age_-1`).
    pub fn index_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .keys
                .iter()
                .map(|(field, order)| format!("{}_{}", field, order.direction()))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}
