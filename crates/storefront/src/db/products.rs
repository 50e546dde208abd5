//! Read access to product documents.

use sqlx::PgPool;
use tracing::instrument;

use nexura_core::store::{Collection, DocumentStore};
use nexura_core::{Product, ProductId};

use super::RepositoryError;

/// Repository for product documents.
pub struct ProductRepository<'a> {
    store: DocumentStore<'a>,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            store: DocumentStore::new(pool),
        }
    }

    /// All products, oldest first, with their IDs attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a document does not decode.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let docs = self.store.list::<Product>(Collection::Products).await?;
        Ok(docs
            .into_iter()
            .map(|(id, product)| product.with_id(ProductId::new(id)))
            .collect())
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document does not decode.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = self
            .store
            .get::<Product>(Collection::Products, id.as_str())
            .await?;
        Ok(product.map(|p| p.with_id(id.clone())))
    }
}
