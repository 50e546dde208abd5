//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use nexura_core::storage::BlobStore;

use crate::config::StorefrontConfig;
use crate::services::{CatalogService, FederatedClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    blobs: BlobStore,
    catalog: CatalogService,
    federated: Option<FederatedClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let blobs = BlobStore::new(config.blob.root.clone(), &config.blob.public_url);
        let catalog = CatalogService::new(pool.clone());
        let federated = config.oidc.clone().map(FederatedClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                blobs,
                catalog,
                federated,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the blob store.
    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.inner.blobs
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the federated sign-in client, if configured.
    #[must_use]
    pub fn federated(&self) -> Option<&FederatedClient> {
        self.inner.federated.as_ref()
    }
}
