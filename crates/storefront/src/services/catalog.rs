//! Cached product reads.
//!
//! The catalog is read on every listing and product page, and admin writes
//! go straight to the document store, so entries expire after
//! [`CATALOG_TTL`] rather than being invalidated.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use nexura_core::{Product, ProductId};

use crate::db::{ProductRepository, RepositoryError};

/// How long a cached product or product list is served.
pub const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Cache key for products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// Read-through product cache over the document store.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CATALOG_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// Every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the document store cannot be read.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.inner.pool).list().await?);
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// One product, or `None` if it does not exist. Misses are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the document store cannot be read.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product = ProductRepository::new(&self.inner.pool).get(id).await?;
        if let Some(product) = &product {
            self.inner
                .cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Look up several products, skipping IDs that no longer exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document store cannot be read.
    pub async fn products_by_id<'a, I>(&self, ids: I) -> Result<Vec<Product>, RepositoryError>
    where
        I: IntoIterator<Item = &'a ProductId>,
    {
        let mut found = Vec::new();
        for id in ids {
            if let Some(product) = self.product(id).await? {
                found.push(product);
            }
        }
        Ok(found)
    }
}
