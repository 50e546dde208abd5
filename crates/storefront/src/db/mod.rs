//! Database operations for the storefront.
//!
//! # Tables
//!
//! - `documents` - Product and user documents (see `nexura_core::store`)
//! - `storefront.account` - Sign-in accounts (password hash or federated subject)
//! - `storefront.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p nexura-cli -- migrate storefront
//! ```

pub mod accounts;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use nexura_core::store::StoreError;

pub use accounts::AccountRepository;
pub use products::ProductRepository;
pub use users::UserDocumentRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => Self::Database(e),
            StoreError::NotFound { collection, id } => Self::NotFound(format!("{collection}/{id}")),
            other @ (StoreError::Corrupt { .. } | StoreError::Encode(_)) => {
                Self::DataCorruption(other.to_string())
            }
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use nexura_core::store::Collection;

    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: RepositoryError = StoreError::NotFound {
            collection: Collection::Users,
            id: "u1".to_owned(),
        }
        .into();
        assert!(matches!(err, RepositoryError::NotFound(ref id) if id == "users/u1"));
    }
}
