//! Checkout route handlers.
//!
//! Placing an order appends it to the user document's `orders` and clears
//! the cart. No payment is taken; `Card` orders only record the chosen card.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::{Address, Card, Order, OrderId, PaymentMethod};

use crate::db::UserDocumentRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, set_flash};
use crate::models::Flash;
use crate::routes::cart::{CartItemView, SummaryView, cart_products, price_cart};
use crate::routes::catalog::{SectionLink, section_links};
use crate::routes::{Layout, load_user};
use crate::state::AppState;

/// Saved card as offered at checkout; only the last four digits are shown.
#[derive(Clone)]
pub struct CardOption {
    pub index: usize,
    pub masked: String,
    pub name: String,
    pub expiry: String,
}

impl CardOption {
    pub(crate) fn new(index: usize, card: &Card) -> Self {
        Self {
            index,
            masked: card.masked(),
            name: card.name.clone(),
            expiry: card.expiry.clone(),
        }
    }
}

/// Saved address as offered at checkout.
#[derive(Clone)]
pub struct AddressOption {
    pub index: usize,
    pub name: String,
    pub line: String,
}

impl AddressOption {
    pub(crate) fn new(index: usize, address: &Address) -> Self {
        Self {
            index,
            name: address.name.clone(),
            line: address.single_line(),
        }
    }
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub address: Option<usize>,
    #[serde(default)]
    pub payment_method: String,
    pub card: Option<usize>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
    pub addresses: Vec<AddressOption>,
    pub cards: Vec<CardOption>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmed.html")]
pub struct ConfirmedTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub order_id: String,
    pub total: String,
    pub quantity: u32,
    pub payment_method: &'static str,
    pub address: String,
    pub date: String,
    pub time: String,
}

/// Display the checkout page. An empty cart sends the shopper back to it.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let doc = load_user(&state, &user).await?;
    if doc.cart.is_empty() {
        set_flash(&session, Flash::error("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let products = cart_products(&state, &doc.cart).await?;
    let (items, summary) = price_cart(&doc.cart, &products);

    Ok(CheckoutTemplate {
        layout: Layout::load(&session, Some(user)).await,
        sections: section_links(None),
        items,
        summary: SummaryView::from(&summary),
        addresses: doc
            .addresses
            .iter()
            .enumerate()
            .map(|(i, a)| AddressOption::new(i, a))
            .collect(),
        cards: doc
            .cards
            .iter()
            .enumerate()
            .map(|(i, c)| CardOption::new(i, c))
            .collect(),
    }
    .into_response())
}

/// Place an order for the current cart.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect, AppError> {
    let mut doc = load_user(&state, &user).await?;
    let products = cart_products(&state, &doc.cart).await?;
    let (_, summary) = price_cart(&doc.cart, &products);

    let address = form.address.and_then(|i| doc.addresses.get(i).cloned());
    let card = form.card.and_then(|i| doc.cards.get(i).cloned());
    let payment_method = PaymentMethod::from_form(&form.payment_method);

    let order = match Order::place(&doc.cart, &summary, address, payment_method, card, Utc::now())
    {
        Ok(order) => order,
        Err(e) => {
            set_flash(&session, Flash::error(capitalize(&e.to_string()))).await;
            return Ok(Redirect::to("/checkout"));
        }
    };

    let order_id = order.order_id.clone();
    doc.record_order(order);
    UserDocumentRepository::new(state.pool())
        .save_checkout(&doc)
        .await?;

    tracing::info!(order_id = %order_id, "order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order_id.as_str())]),
    );

    Ok(Redirect::to(&format!(
        "/checkout/confirmed/{}",
        urlencoding::encode(order_id.as_str())
    )))
}

/// Display an order confirmation.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn confirmed(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_user(&state, &user).await?;
    let order = doc
        .order(&OrderId::new(order_id))
        .ok_or_else(|| AppError::NotFound("order".to_owned()))?;

    Ok(ConfirmedTemplate {
        layout: Layout::load(&session, Some(user)).await,
        sections: section_links(None),
        order_id: order.order_id.to_string(),
        total: order.price.to_string(),
        quantity: order.quantity,
        payment_method: order.payment_method.as_str(),
        address: order
            .address
            .as_ref()
            .map(Address::single_line)
            .unwrap_or_default(),
        date: order.date_label(),
        time: order.time_label(),
    })
}

/// Upper-case the first letter of a validation message.
pub(crate) fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("your cart is empty"), "Your cart is empty");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_card_option_hides_number() {
        let card = Card::new("1234-5678-9012-3456", "A Shopper", "04/29").unwrap();
        let option = CardOption::new(0, &card);
        assert!(!option.masked.contains("1234-5678"));
        assert!(option.masked.ends_with("3456"));
    }
}
