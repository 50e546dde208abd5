//! User document access.
//!
//! Reads load the whole document; writes replace a single top-level field so
//! that, for example, a cart update never rewrites the order history.

use sqlx::PgPool;
use tracing::instrument;

use nexura_core::store::{Collection, DocumentStore};
use nexura_core::{Address, Card, Cart, Favorites, Order, UserDocument, UserId};

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

    /// Load a user document.
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

    /// Write a new user document unless one already exists.
    ///
    /// Returns `true` when the document was created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create_if_absent(&self, user: &UserDocument) -> Result<bool, RepositoryError> {
        Ok(self
            .store
            .create_if_absent(Collection::Users, user.id.as_str(), user)
            .await?)
    }

    /// Replace the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_cart(&self, id: &UserId, cart: &Cart) -> Result<(), RepositoryError> {
        self.save_field(id, "cart", cart).await
    }

    /// Replace the favorites list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_favorites(
        &self,
        id: &UserId,
        favorites: &Favorites,
    ) -> Result<(), RepositoryError> {
        self.save_field(id, "favorites", favorites).await
    }

    /// Replace the order history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_orders(&self, id: &UserId, orders: &[Order]) -> Result<(), RepositoryError> {
        self.save_field(id, "orders", &orders).await
    }

    /// Replace the saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_addresses(
        &self,
        id: &UserId,
        addresses: &[Address],
    ) -> Result<(), RepositoryError> {
        self.save_field(id, "addresses", &addresses).await
    }

    /// Replace the saved cards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_cards(&self, id: &UserId, cards: &[Card]) -> Result<(), RepositoryError> {
        self.save_field(id, "cards", &cards).await
    }

    /// Update the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_profile(
        &self,
        id: &UserId,
        name: &str,
        bio: &str,
    ) -> Result<(), RepositoryError> {
        self.save_field(id, "name", &name).await?;
        self.save_field(id, "bio", &bio).await
    }

    /// Point the profile picture at a new URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    pub async fn save_profile_pic(&self, id: &UserId, url: &str) -> Result<(), RepositoryError> {
        self.save_field(id, "profilePic", &url).await
    }

    /// Persist a placed order: the new order list, then the emptied cart.
    ///
    /// The two writes are independent; a failure between them leaves the
    /// order recorded with the cart still filled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user document is missing.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save_checkout(&self, user: &UserDocument) -> Result<(), RepositoryError> {
        self.save_orders(&user.id, &user.orders).await?;
        self.save_cart(&user.id, &user.cart).await
    }

    async fn save_field<T: serde::Serialize + Sync>(
        &self,
        id: &UserId,
        field: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        self.store
            .update_field(Collection::Users, id.as_str(), field, value)
            .await?;
        Ok(())
    }
}
