//! Account repository for sign-in data.
//!
//! Accounts live in `storefront.account`. Password accounts carry an argon2
//! hash; federated accounts carry the issuer and the provider's subject.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use nexura_core::{Email, UserId};

use super::RepositoryError;
use crate::models::{Account, AuthProvider};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    provider: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id.to_string()),
            email,
            provider: AuthProvider::from_column(&row.provider),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountWithHashRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: Option<String>,
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a password account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO storefront.account (id, email, password_hash, provider)
            VALUES ($1, $2, $3, 'password')
            RETURNING id, email, provider, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.try_into()
    }

    /// Get an account and its password hash by email.
    ///
    /// The hash is `None` for federated accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, Option<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(
            r"
            SELECT id, email, provider, created_at, password_hash
            FROM storefront.account
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.account.try_into()?, r.password_hash)))
            .transpose()
    }

    /// Find the account linked to a federated identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_subject(
        &self,
        issuer: &str,
        subject: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, provider, created_at
            FROM storefront.account
            WHERE provider_issuer = $1 AND provider_subject = $2
            ",
        )
        .bind(issuer)
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an account for a federated identity, or link the identity to
    /// an existing account with the same (provider-verified) email.
    ///
    /// An existing account keeps its original provider column so password
    /// sign-in continues to work.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the subject is already linked
    /// to a different account.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn link_or_create_federated(
        &self,
        email: &Email,
        issuer: &str,
        subject: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO storefront.account (id, email, provider, provider_issuer, provider_subject)
            VALUES ($1, $2, $3, $3, $4)
            ON CONFLICT (email) DO UPDATE
                SET provider_issuer = EXCLUDED.provider_issuer,
                    provider_subject = EXCLUDED.provider_subject
            RETURNING id, email, provider, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email.as_str())
        .bind(issuer)
        .bind(subject)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "federated identity"))?;

        row.try_into()
    }
}
