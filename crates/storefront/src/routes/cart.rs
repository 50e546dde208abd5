//! Cart route handlers.
//!
//! The cart lives in the user document. Every change loads the document,
//! applies the change with [`nexura_core::Cart`] and writes the `cart` field
//! back, then redirects to the cart page.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::{Cart, CartSummary, Product, ProductId};

use crate::db::UserDocumentRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, set_flash};
use crate::models::Flash;
use crate::routes::catalog::{SectionLink, section_links};
use crate::routes::{Layout, load_user};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

/// Price breakdown display data.
#[derive(Clone)]
pub struct SummaryView {
    pub items: u32,
    pub original: String,
    pub discount: String,
    pub pickup_fee: String,
    pub tax: String,
    pub total: String,
}

impl From<&CartSummary> for SummaryView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            items: summary.items,
            original: summary.original.to_string(),
            discount: summary.discount.to_string(),
            pickup_fee: summary.pickup_fee.to_string(),
            tax: summary.tax.to_string(),
            total: summary.total.to_string(),
        }
    }
}

/// Join a cart with its products and price it.
///
/// Entries whose product has been deleted are left out of both the lines and
/// the summary.
#[must_use]
pub fn price_cart(cart: &Cart, products: &[Product]) -> (Vec<CartItemView>, CartSummary) {
    let by_id: HashMap<&ProductId, &Product> = products.iter().map(|p| (&p.id, p)).collect();

    let items = cart
        .iter()
        .filter_map(|(id, entry)| {
            let product = by_id.get(id)?;
            Some(CartItemView {
                product_id: id.to_string(),
                name: product.name.clone(),
                image: product.primary_image().map(String::from),
                color: entry.color.clone(),
                size: entry.size.clone(),
                quantity: entry.quantity,
                unit_price: product.price.to_string(),
                line_price: product.price.times(entry.quantity).to_string(),
            })
        })
        .collect();

    let summary = CartSummary::for_cart(cart, |id| by_id.get(id).map(|p| (*p).clone()));
    (items, summary)
}

/// Load the products a cart references.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub async fn cart_products(state: &AppState, cart: &Cart) -> Result<Vec<Product>, AppError> {
    let ids: Vec<&ProductId> = cart.iter().map(|(id, _)| id).collect();
    Ok(state.catalog().products_by_id(ids).await?)
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart badge response.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
}

/// Display cart page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_user(&state, &user).await?;
    let products = cart_products(&state, &doc.cart).await?;
    let (items, summary) = price_cart(&doc.cart, &products);

    Ok(CartShowTemplate {
        layout: Layout::load(&session, Some(user)).await,
        sections: section_links(None),
        items,
        summary: SummaryView::from(&summary),
    })
}

/// Add a product to the cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(form.product_id);
    if state.catalog().product(&product_id).await?.is_none() {
        return Err(AppError::NotFound("product".to_owned()));
    }

    let mut doc = load_user(&state, &user).await?;
    let quantity = form.quantity.unwrap_or(1);
    if !doc
        .cart
        .add(product_id.clone(), quantity, form.color, form.size)
    {
        set_flash(&session, Flash::error("Quantity must be at least 1")).await;
        return Ok(Redirect::to("/cart"));
    }

    UserDocumentRepository::new(state.pool())
        .save_cart(&user.id, &doc.cart)
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    set_flash(&session, Flash::success("Added to cart")).await;
    Ok(Redirect::to("/cart"))
}

/// Set a cart entry's quantity. Zero removes the entry.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(form.product_id);
    let mut doc = load_user(&state, &user).await?;

    if doc.cart.update_quantity(&product_id, form.quantity) {
        UserDocumentRepository::new(state.pool())
            .save_cart(&user.id, &doc.cart)
            .await?;
    } else {
        set_flash(&session, Flash::error("That item is no longer in your cart")).await;
    }

    Ok(Redirect::to("/cart"))
}

/// Remove a cart entry.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(form.product_id);
    let mut doc = load_user(&state, &user).await?;

    if doc.cart.remove(&product_id) {
        UserDocumentRepository::new(state.pool())
            .save_cart(&user.id, &doc.cart)
            .await?;
        set_flash(&session, Flash::success("Removed from cart")).await;
    }

    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect, AppError> {
    UserDocumentRepository::new(state.pool())
        .save_cart(&user.id, &Cart::default())
        .await?;
    set_flash(&session, Flash::success("Cart cleared")).await;
    Ok(Redirect::to("/cart"))
}

/// Cart badge count. Signed-out visitors always have zero items.
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartCount>, AppError> {
    let count = match user {
        Some(user) => load_user(&state, &user).await?.cart.total_items(),
        None => 0,
    };
    Ok(Json(CartCount { count }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexura_core::Price;

    use super::*;

    fn product(id: &str, rupees: i64, discount: &str) -> Product {
        Product {
            name: id.to_uppercase(),
            price: Price::from_rupees(rupees),
            discount: discount.to_owned(),
            ..Product::default()
        }
        .with_id(ProductId::new(id))
    }

    #[test]
    fn test_price_cart_matches_worked_example() {
        let mut cart = Cart::default();
        cart.add(ProductId::new("p1"), 2, None, None);

        let (items, summary) = price_cart(&cart, &[product("p1", 100, "10%")]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_price, "₹200.00");
        assert_eq!(items[0].size, "40.5");

        let view = SummaryView::from(&summary);
        assert_eq!(view.original, "₹200.00");
        assert_eq!(view.discount, "₹20.00");
        assert_eq!(view.pickup_fee, "₹0.00");
        assert_eq!(view.tax, "₹10.00");
        assert_eq!(view.total, "₹190.00");
    }

    #[test]
    fn test_price_cart_skips_deleted_products() {
        let mut cart = Cart::default();
        cart.add(ProductId::new("gone"), 1, None, None);
        cart.add(ProductId::new("p2"), 1, None, None);

        let (items, summary) = price_cart(&cart, &[product("p2", 40, "")]);
        assert_eq!(items.len(), 1);
        assert_eq!(summary.items, 1);
        assert_eq!(summary.pickup_fee, Price::from_rupees(99));
    }
}
