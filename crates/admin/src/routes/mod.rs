//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Dashboard
//! GET  /                             - Counts and recent orders
//!
//! # Auth
//! GET  /auth/login                   - Login page
//! POST /auth/login                   - Login action
//! POST /auth/logout                  - Logout
//!
//! # Products
//! GET  /products                     - Product listing
//! GET  /products/new                 - New product form
//! POST /products/new                 - Create product (multipart)
//! GET  /products/{id}/edit           - Edit form
//! POST /products/{id}/edit           - Update product (multipart)
//! POST /products/{id}/images/delete  - Delete one image
//! POST /products/{id}/delete         - Delete product
//!
//! # Users
//! GET  /users                        - All storefront users
//!
//! # Orders
//! GET  /orders                       - Orders across all users (?status=)
//! POST /orders/{user}/status         - Set an order's status
//! POST /orders/{user}/cancel         - Cancel an order
//! POST /orders/{user}/delete         - Delete an order
//! ```
//!
//! Every page requires a signed-in admin; every POST outside `/auth`
//! requires a role that can write.

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
};

use nexura_core::AdminRole;

use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

/// Largest accepted product form, images included.
const MAX_PRODUCT_FORM_BYTES: usize = 25 * 1024 * 1024;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub can_write: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            role: match admin.role {
                AdminRole::SuperAdmin => "Super admin",
                AdminRole::Admin => "Admin",
                AdminRole::Viewer => "Viewer",
            }
            .to_string(),
            can_write: admin.role.can_write(),
        }
    }
}

/// Chrome shared by every signed-in page.
pub struct Page {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
}

impl Page {
    #[must_use]
    pub fn new(admin: &CurrentAdmin, current_path: &'static str, flash: Option<Flash>) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path,
            flash,
        }
    }

    /// Whether a nav link should be highlighted.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

/// Render a template, logging and falling back to a plain message on failure.
pub fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/new", get(products::new_page).post(products::create))
        .route("/{id}/edit", get(products::edit_page).post(products::update))
        .route("/{id}/images/delete", post(products::delete_image))
        .route("/{id}/delete", post(products::delete))
        .layer(DefaultBodyLimit::max(MAX_PRODUCT_FORM_BYTES))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{user}/status", post(orders::update_status))
        .route("/{user}/cancel", post(orders::cancel))
        .route("/{user}/delete", post(orders::delete))
}

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/users", get(users::index))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexura_core::{AdminUserId, Email};

    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(1),
            email: Email::parse("ops@nexura.in").unwrap(),
            name: "Ops".to_owned(),
            role,
        }
    }

    #[test]
    fn test_admin_user_view_role() {
        let view = AdminUserView::from(&admin(AdminRole::Viewer));
        assert_eq!(view.role, "Viewer");
        assert!(!view.can_write);
        assert!(AdminUserView::from(&admin(AdminRole::SuperAdmin)).can_write);
    }

    #[test]
    fn test_nav_highlighting() {
        let page = Page::new(&admin(AdminRole::Admin), "/products", None);
        assert!(page.is_active("/products"));
        assert!(!page.is_active("/"));
        assert!(Page::new(&admin(AdminRole::Admin), "/", None).is_active("/"));
    }
}
