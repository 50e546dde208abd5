//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET  /                            - All products
//! GET  /woman|/man|/kids|/sports|/sale - Section listings
//! GET  /products/{id}               - Product detail (?page= for reviews)
//! POST /products/{id}/favorite      - Toggle favorite
//! GET  /favorites                   - Favorited products
//!
//! # Cart
//! GET  /cart                        - Cart with pricing summary
//! POST /cart/add                    - Add entry
//! POST /cart/update                 - Set quantity
//! POST /cart/remove                 - Remove entry
//! POST /cart/clear                  - Empty the cart
//! GET  /api/cart/count              - Cart badge count (JSON)
//!
//! # Checkout
//! GET  /checkout                    - Address, card and payment selection
//! POST /checkout                    - Place order
//! GET  /checkout/confirmed/{order}  - Confirmation
//!
//! # Account (requires auth)
//! GET  /account                     - Profile
//! POST /account                     - Save name and bio
//! POST /account/addresses           - Add address
//! POST /account/addresses/{i}/delete - Remove address
//! POST /account/cards               - Add card
//! POST /account/cards/{i}/delete    - Remove card
//! POST /account/picture             - Upload profile picture (multipart)
//! GET  /account/orders              - Order history
//! POST /account/orders/cancel       - Cancel an order
//! POST /account/orders/remove       - Remove a cancelled order
//!
//! # Auth
//! GET  /auth/login                  - Login page
//! POST /auth/login                  - Login action
//! GET  /auth/register               - Register page
//! POST /auth/register               - Register action
//! POST /auth/logout                 - Logout action
//! GET  /auth/federated/login        - Redirect to the identity provider
//! GET  /auth/federated/callback     - Handle the provider callback
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod federated_auth;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_sessions::Session;

use nexura_core::{Favorites, UserDocument};

use crate::db::UserDocumentRepository;
use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter, take_flash};
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Largest accepted profile picture upload.
const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Page chrome shared by every full-page template: who is signed in and
/// the pending flash message.
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the layout, consuming the pending flash message.
    pub async fn load(session: &Session, user: Option<CurrentUser>) -> Self {
        Self {
            user,
            flash: take_flash(session).await,
        }
    }
}

/// Load the signed-in user's document.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the account has no user document.
pub async fn load_user(state: &AppState, user: &CurrentUser) -> Result<UserDocument, AppError> {
    UserDocumentRepository::new(state.pool())
        .get(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_owned()))
}

/// The signed-in user's favorites, for flagging product tiles.
///
/// A failed document load is logged and treated as "no favorites" so the
/// page still renders.
pub async fn load_favorites(state: &AppState, user: Option<&CurrentUser>) -> Option<Favorites> {
    let user = user?;
    favorites_or_none(user, load_user(state, user).await)
}

fn favorites_or_none(
    user: &CurrentUser,
    doc: Result<UserDocument, AppError>,
) -> Option<Favorites> {
    match doc {
        Ok(doc) => Some(doc.favorites),
        Err(e) => {
            tracing::warn!(user_id = user.id.as_str(), "Failed to load favorites: {}", e);
            None
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/federated/login", get(federated_auth::login))
        .route("/federated/callback", get(federated_auth::callback))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/favorite", post(products::toggle_favorite))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/count", get(cart::count))
        .layer(api_rate_limiter())
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place))
        .route("/confirmed/{order}", get(checkout::confirmed))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show).post(account::update_profile))
        .route("/addresses", post(account::add_address))
        .route("/addresses/{index}/delete", post(account::delete_address))
        .route("/cards", post(account::add_card))
        .route("/cards/{index}/delete", post(account::delete_card))
        .route(
            "/picture",
            post(account::upload_picture).layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES)),
        )
        .route("/orders", get(account::orders))
        .route("/orders/cancel", post(account::cancel_order))
        .route("/orders/remove", post(account::remove_order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog sections
        .route("/", get(catalog::home))
        .route("/woman", get(catalog::woman))
        .route("/man", get(catalog::man))
        .route("/kids", get(catalog::kids))
        .route("/sports", get(catalog::sports))
        .route("/sale", get(catalog::sale))
        .route("/favorites", get(catalog::favorites))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use nexura_core::{Email, ProductId, UserId};

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            name: "Asha".to_owned(),
            email: Email::parse("asha@nexura.in").unwrap(),
        }
    }

    #[test]
    fn test_favorites_from_loaded_document() {
        let mut doc = UserDocument::new(UserId::new("u1"), "Asha", "asha@nexura.in", "", Utc::now());
        doc.favorites.toggle(&ProductId::new("p1"));
        let favorites = favorites_or_none(&user(), Ok(doc)).unwrap();
        assert!(favorites.contains(&ProductId::new("p1")));
    }

    #[test]
    fn test_failed_load_means_no_favorites() {
        let doc = Err(AppError::NotFound("user".to_owned()));
        assert!(favorites_or_none(&user(), doc).is_none());
    }
}
