//! Sign-in accounts.

use chrono::{DateTime, Utc};

use nexura_core::{Email, UserId};

/// How an account signs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProvider {
    Password,
    /// OpenID Connect issuer URL.
    Federated(String),
}

impl AuthProvider {
    /// Value stored in `storefront.account.provider`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Password => "password",
            Self::Federated(issuer) => issuer,
        }
    }

    #[must_use]
    pub fn from_column(value: &str) -> Self {
        if value == "password" {
            Self::Password
        } else {
            Self::Federated(value.to_owned())
        }
    }
}

/// A storefront account (domain type).
///
/// The account ID doubles as the ID of the user's document.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: UserId,
    pub email: Email,
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_column_round_trip() {
        assert_eq!(AuthProvider::from_column("password"), AuthProvider::Password);
        let google = AuthProvider::from_column("https://accounts.google.com");
        assert_eq!(google.as_str(), "https://accounts.google.com");
    }
}
