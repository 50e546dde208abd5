//! Authentication error types.

use thiserror::Error;

use nexura_core::{EmailError, ProfileError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Sign-up form failed validation.
    #[error("{0}")]
    Validation(#[from] ProfileError),

    /// Invalid credentials (wrong password, unknown email, or no password set).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The identity provider did not vouch for the email address.
    #[error("email address not verified by the identity provider")]
    UnverifiedEmail,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
