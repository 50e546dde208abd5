//! Order management route handlers.
//!
//! Orders live inside user documents, so every change loads the owning
//! user, edits its order list and writes the list back.

use std::str::FromStr;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::{OrderId, OrderStatus, UserDocument, UserId};

use crate::db::UserDocumentRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess, set_flash, take_flash};
use crate::models::Flash;
use crate::routes::{Page, render};
use crate::services::{AdminOrder, OrderBook};
use crate::state::AppState;

/// Query parameters for the order list.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// Form posted by the per-order actions.
#[derive(Debug, Deserialize)]
pub struct OrderActionForm {
    pub order_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// One row of the order table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub user_id: String,
    pub user_name: String,
    pub invoice_date: String,
    pub order_id: String,
    pub price: String,
    pub quantity: u32,
    pub status: &'static str,
    pub payment_method: &'static str,
    pub ship_to: String,
}

impl From<&AdminOrder> for OrderRowView {
    fn from(row: &AdminOrder) -> Self {
        let ship_to = row
            .order
            .address
            .as_ref()
            .map(|a| format!("{}, {} {}", a.city, a.state, a.zipcode))
            .unwrap_or_default();
        Self {
            user_id: row.user_id.to_string(),
            user_name: row.user_name.clone(),
            invoice_date: row.invoice_date.clone(),
            order_id: row.order.order_id.to_string(),
            price: row.order.price.to_string(),
            quantity: row.order.quantity,
            status: row.order.status.as_str(),
            payment_method: row.order.payment_method.as_str(),
            ship_to,
        }
    }
}

/// Order list template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: Page,
    pub orders: Vec<OrderRowView>,
    pub filter: Option<&'static str>,
    pub statuses: [OrderStatus; 4],
    pub total: usize,
}

/// Parse the `?status=` filter. Unknown values show every order.
fn parse_filter(query: &OrdersQuery) -> Option<OrderStatus> {
    query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| OrderStatus::from_str(s).ok())
}

/// Order list across all users.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Result<Html<String>, AppError> {
    let users = UserDocumentRepository::new(state.pool()).list().await?;
    let book = OrderBook::from_users(&users);
    let filter = parse_filter(&query);

    let orders = book
        .with_status(filter)
        .into_iter()
        .map(OrderRowView::from)
        .collect();

    Ok(render(&OrdersIndexTemplate {
        page: Page::new(&admin, "/orders", take_flash(&session).await),
        orders,
        filter: filter.map(|s| s.as_str()),
        statuses: OrderStatus::ALL,
        total: book.len(),
    }))
}

async fn load_user(state: &AppState, user_id: &UserId) -> Result<UserDocument, AppError> {
    UserDocumentRepository::new(state.pool())
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
}

async fn save_user_orders(state: &AppState, user: &UserDocument) -> Result<(), AppError> {
    UserDocumentRepository::new(state.pool())
        .save_orders(&user.id, &user.orders)
        .await?;
    Ok(())
}

/// Set an order's status. Any status may follow any other.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.email, order_id = %form.order_id))]
pub async fn update_status(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<String>,
    Form(form): Form<OrderActionForm>,
) -> Result<Redirect, AppError> {
    let status = form
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("missing status".to_owned()))
        .and_then(|s| OrderStatus::from_str(s).map_err(|e| AppError::BadRequest(e.to_string())))?;

    let mut user = load_user(&state, &UserId::new(user_id)).await?;
    user.set_order_status(&OrderId::new(form.order_id.as_str()), status)
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    save_user_orders(&state, &user).await?;

    tracing::info!(%status, "Order status updated");
    set_flash(
        &session,
        Flash::success(format!("Order {} is now {status}", form.order_id)),
    )
    .await;
    Ok(Redirect::to("/orders"))
}

/// Mark an order cancelled. Cancelling an already cancelled order is a no-op.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.email, order_id = %form.order_id))]
pub async fn cancel(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<String>,
    Form(form): Form<OrderActionForm>,
) -> Result<Redirect, AppError> {
    let mut user = load_user(&state, &UserId::new(user_id)).await?;
    let order_id = OrderId::new(form.order_id.as_str());

    mark_cancelled(&mut user, &order_id)?;
    save_user_orders(&state, &user).await?;

    tracing::info!("Order cancelled");
    set_flash(&session, Flash::success(format!("Order {order_id} cancelled"))).await;
    Ok(Redirect::to("/orders"))
}

fn mark_cancelled(user: &mut UserDocument, order_id: &OrderId) -> Result<(), AppError> {
    user.set_order_status(order_id, OrderStatus::Cancelled)
        .map_err(|e| AppError::NotFound(e.to_string()))
}

/// Remove an order from its user's history.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.email, order_id = %form.order_id))]
pub async fn delete(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<String>,
    Form(form): Form<OrderActionForm>,
) -> Result<Redirect, AppError> {
    let mut user = load_user(&state, &UserId::new(user_id)).await?;
    let order_id = OrderId::new(form.order_id.as_str());

    user.delete_order(&order_id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    save_user_orders(&state, &user).await?;

    tracing::info!("Order deleted");
    set_flash(&session, Flash::success(format!("Order {order_id} deleted"))).await;
    Ok(Redirect::to("/orders"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use nexura_core::{Address, Cart, CartSummary, Order, PaymentMethod, ProductId};

    use super::*;

    fn user_with_order() -> (UserDocument, OrderId) {
        let mut cart = Cart::default();
        cart.add(ProductId::new("p1"), 1, None, None);
        let order = Order::place(
            &cart,
            &CartSummary::default(),
            Some(Address::new("Asha", "Pune", "MH", "411001", "9800000000").unwrap()),
            PaymentMethod::CashOnDelivery,
            None,
            Utc::now(),
        )
        .unwrap();
        let order_id = order.order_id.clone();
        let mut user = UserDocument::new(UserId::new("u1"), "Asha", "a@nexura.in", "", Utc::now());
        user.orders.push(order);
        (user, order_id)
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (mut user, order_id) = user_with_order();
        mark_cancelled(&mut user, &order_id).unwrap();
        mark_cancelled(&mut user, &order_id).unwrap();
        assert_eq!(user.orders.first().unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_unknown_order_is_not_found() {
        let (mut user, _) = user_with_order();
        let result = mark_cancelled(&mut user, &OrderId::new("#missing"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    fn query(status: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            status: status.map(str::to_owned),
        }
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter(&query(Some("Cancelled"))),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(parse_filter(&query(Some(""))), None);
        assert_eq!(parse_filter(&query(Some("Shipped?"))), None);
        assert_eq!(parse_filter(&query(None)), None);
    }

    #[test]
    fn test_action_form_status_is_optional() {
        let form: OrderActionForm =
            serde_json::from_value(serde_json::json!({ "order_id": "ABC123" })).unwrap();
        assert_eq!(form.order_id, "ABC123");
        assert!(form.status.is_none());
    }
}
