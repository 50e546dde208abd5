//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! nx-cli admin create -e ops@nexura.in -n "Ops" -r super_admin -p '<password>'
//! nx-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use thiserror::Error;

use nexura_admin::db::{AdminUserRepository, RepositoryError, create_pool};
use nexura_admin::models::AdminUser;
use nexura_admin::services::{AdminAuthError, AdminAuthService};
use nexura_core::AdminRole;

use super::{CommandError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    #[error(transparent)]
    Auth(#[from] AdminAuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError::InvalidRole` for an unknown role, and
/// `AdminError::Auth` for a bad email, short password or duplicate email.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUser, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let pool = create_pool(&database_url("ADMIN_DATABASE_URL")?).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let user = AdminAuthService::new(&pool)
        .create_user(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user)
}

/// Print every admin user.
///
/// # Errors
///
/// Returns `AdminError` if the database cannot be reached.
pub async fn list_users() -> Result<(), AdminError> {
    let pool = create_pool(&database_url("ADMIN_DATABASE_URL")?).await?;
    let users = AdminUserRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        if users.is_empty() {
            println!("No admin users. Create one with `nx-cli admin create`.");
        }
        for user in &users {
            println!(
                "{:>4}  {:<32}  {:<12}  {}",
                user.id, user.email, user.role, user.name
            );
        }
    }
    Ok(())
}
