//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! nx-cli migrate storefront
//! nx-cli migrate admin
//! nx-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Both fall back to `DATABASE_URL`. When both sets run against one
//! database they share the `_sqlx_migrations` table, so each run ignores
//! versions applied by the other.
//!
//! # Migration Files
//!
//! - Storefront (documents, accounts, sessions): `crates/storefront/migrations/`
//! - Admin (admin users, sessions): `crates/admin/migrations/`

use sqlx::migrate::{MigrateError, Migrator};
use thiserror::Error;

use nexura_admin::db::create_pool;

use super::{CommandError, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails,
/// or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    run(
        "storefront",
        "STOREFRONT_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations"),
    )
    .await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails,
/// or a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    run(
        "admin",
        "ADMIN_DATABASE_URL",
        sqlx::migrate!("../admin/migrations"),
    )
    .await
}

async fn run(
    label: &str,
    env_key: &'static str,
    mut migrator: Migrator,
) -> Result<(), MigrationError> {
    let url = database_url(env_key)?;

    tracing::info!("Connecting to {label} database...");
    let pool = create_pool(&url).await?;

    tracing::info!("Running {label} migrations...");
    migrator.set_ignore_missing(true).run(&pool).await?;

    tracing::info!("{label} migrations complete");
    Ok(())
}
