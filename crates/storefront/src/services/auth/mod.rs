//! Authentication service.
//!
//! Provides password registration/sign-in and federated account linking.
//! Every successful sign-in guarantees the account has a user document.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use nexura_core::{Email, SignupForm, UserDocument};

use crate::db::{AccountRepository, RepositoryError, UserDocumentRepository};
use crate::models::{Account, CurrentUser};
use crate::services::federated::FederatedIdentity;

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    users: UserDocumentRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            users: UserDocumentRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new account from a validated sign-up form and create its
    /// user document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &SignupForm) -> Result<CurrentUser, AuthError> {
        let password_hash = hash_password(&form.password)?;

        let account = self
            .accounts
            .create_with_password(&form.email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.ensure_user_document(&account, &form.name, "").await?;
        tracing::info!(user_id = %account.id, "account registered");

        Ok(CurrentUser {
            id: account.id,
            name: form.name.clone(),
            email: account.email,
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong
    /// or the account has no password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;

        let (account, password_hash) = self
            .accounts
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let password_hash = password_hash.ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let user = self.ensure_user_document(&account, "", "").await?;
        Ok(CurrentUser {
            id: account.id,
            name: user.display_name().to_owned(),
            email: account.email,
        })
    }

    // =========================================================================
    // Federated Authentication
    // =========================================================================

    /// Sign in with an identity asserted by an OpenID Connect provider.
    ///
    /// The account is found by `(issuer, subject)`; failing that a verified
    /// email is linked to, or creates, an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnverifiedEmail` when a new link would rely on an
    /// unverified email.
    #[instrument(skip(self, identity), fields(subject = %identity.subject))]
    pub async fn federated_sign_in(
        &self,
        issuer: &str,
        identity: &FederatedIdentity,
    ) -> Result<CurrentUser, AuthError> {
        let account = match self
            .accounts
            .get_by_subject(issuer, &identity.subject)
            .await?
        {
            Some(account) => account,
            None => {
                if !identity.email_verified {
                    return Err(AuthError::UnverifiedEmail);
                }
                let email = Email::parse(&identity.email)?;
                self.accounts
                    .link_or_create_federated(&email, issuer, &identity.subject)
                    .await?
            }
        };

        let user = self
            .ensure_user_document(&account, &identity.name, &identity.picture)
            .await?;
        Ok(CurrentUser {
            id: account.id,
            name: user.display_name().to_owned(),
            email: account.email,
        })
    }

    /// Load the user document, creating `{name, email, profilePic, createdAt}`
    /// when the account has none yet.
    async fn ensure_user_document(
        &self,
        account: &Account,
        name: &str,
        photo_url: &str,
    ) -> Result<UserDocument, AuthError> {
        if let Some(user) = self.users.get(&account.id).await? {
            return Ok(user);
        }

        let user = UserDocument::new(
            account.id.clone(),
            name,
            account.email.as_str(),
            photo_url,
            Utc::now(),
        );
        if self.users.create_if_absent(&user).await? {
            tracing::info!(user_id = %account.id, "user document created");
        }
        Ok(user)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
