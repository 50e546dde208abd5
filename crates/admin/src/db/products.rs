//! Product document management.

use sqlx::PgPool;
use tracing::instrument;

use nexura_core::store::{Collection, DocumentStore};
use nexura_core::{Product, ProductId};

use super::RepositoryError;

/// Repository for documents in the `products` collection.
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

    /// All products, oldest first.
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

    /// Number of product documents.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.store.count(Collection::Products).await?)
    }

    /// Store a new product under a generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &Product) -> Result<ProductId, RepositoryError> {
        let id = self.store.add(Collection::Products, product).await?;
        Ok(ProductId::new(id))
    }

    /// Replace an existing product document.
    ///
    /// Reviews and ratings are part of the document, so callers pass the
    /// loaded product back with their edits applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store
            .set(Collection::Products, product.id.as_str(), product)
            .await?;
        Ok(())
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.store.delete(Collection::Products, id.as_str()).await?)
    }
}
