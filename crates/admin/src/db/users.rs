//! User document access for the admin console.
//!
//! Admins read every user document and only ever rewrite the `orders`
//! field.

use sqlx::PgPool;
use tracing::instrument;

use nexura_core::store::{Collection, DocumentStore};
use nexura_core::{Order, UserDocument, UserId};

use super::RepositoryError;

/// Repository for documents in the `users` collection.
pub struct UserDocumentRepository<'a> {
    store: DocumentStore<'a>,
}

impl<'a> UserDocumentRepository<'a> {
    /// Create a new user document repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            store: DocumentStore::new(pool),
        }
    }

    /// Every user document, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a document does not decode.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserDocument>, RepositoryError> {
        let docs = self.store.list::<UserDocument>(Collection::Users).await?;
        Ok(docs
            .into_iter()
            .map(|(id, user)| user.with_id(UserId::new(id)))
            .collect())
    }

    /// Load one user document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document does not decode.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: &UserId) -> Result<Option<UserDocument>, RepositoryError> {
        let user = self
            .store
            .get::<UserDocument>(Collection::Users, id.as_str())
            .await?;
        Ok(user.map(|u| u.with_id(id.clone())))
    }

    /// Number of user documents.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.store.count(Collection::Users).await?)
    }

    /// Replace the order history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    #[instrument(skip(self, orders), fields(user_id = %id))]
    pub async fn save_orders(&self, id: &UserId, orders: &[Order]) -> Result<(), RepositoryError> {
        self.store
            .update_field(Collection::Users, id.as_str(), "orders", &orders)
            .await?;
        Ok(())
    }
}
