//! Account route handlers: profile, addresses, cards, picture and orders.
//!
//! All routes require a signed-in user. Validation failures are shown as
//! flash messages on the page the form came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::storage::{BlobError, profile_picture_path};
use nexura_core::{Address, Card, Order, OrderId, UserDocument};

use crate::db::UserDocumentRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, set_flash};
use crate::models::Flash;
use crate::routes::catalog::{SectionLink, section_links};
use crate::routes::checkout::{AddressOption, CardOption, capitalize};
use crate::routes::{Layout, load_user};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

/// Address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub mobile: String,
}

/// Card form data.
#[derive(Debug, Deserialize)]
pub struct CardForm {
    pub number: String,
    pub name: String,
    pub expiry: String,
}

/// Order action form data.
#[derive(Debug, Deserialize)]
pub struct OrderActionForm {
    pub order_id: String,
}

// =============================================================================
// Views
// =============================================================================

/// Order history row.
#[derive(Clone)]
pub struct OrderView {
    pub order_id: String,
    pub price: String,
    pub quantity: u32,
    pub status: &'static str,
    pub payment_method: &'static str,
    pub address: String,
    pub date: String,
    pub time: String,
    pub can_cancel: bool,
    pub can_remove: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            price: order.price.to_string(),
            quantity: order.quantity,
            status: order.status.as_str(),
            payment_method: order.payment_method.as_str(),
            address: order
                .address
                .as_ref()
                .map(Address::single_line)
                .unwrap_or_default(),
            date: order.date_label(),
            time: order.time_label(),
            can_cancel: order.can_cancel(),
            can_remove: order.can_remove(),
        }
    }
}

/// Newest orders first.
fn order_history(doc: &UserDocument) -> Vec<OrderView> {
    let mut orders: Vec<&Order> = doc.orders.iter().collect();
    orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    orders.into_iter().map(OrderView::from).collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/show.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub profile_pic: String,
    pub member_since: Option<String>,
    pub addresses: Vec<AddressOption>,
    pub cards: Vec<CardOption>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub orders: Vec<OrderView>,
}

// =============================================================================
// Profile Routes
// =============================================================================

/// Display the profile page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_user(&state, &user).await?;

    Ok(AccountTemplate {
        sections: section_links(None),
        name: doc.name.clone(),
        email: doc.email.clone(),
        bio: doc.bio.clone(),
        profile_pic: doc.profile_pic.clone(),
        member_since: doc.created_at.map(|t| t.format("%B %Y").to_string()),
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
        layout: Layout::load(&session, Some(user)).await,
    })
}

/// Save name and bio.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        set_flash(&session, Flash::error("Name is required")).await;
        return Ok(Redirect::to("/account"));
    }

    UserDocumentRepository::new(state.pool())
        .save_profile(&user.id, name, form.bio.trim())
        .await?;

    // Keep the greeting in the session in step with the document
    user.name = name.to_owned();
    session
        .insert(crate::models::session_keys::CURRENT_USER, &user)
        .await?;

    set_flash(&session, Flash::success("Profile updated")).await;
    Ok(Redirect::to("/account"))
}

/// Upload a new profile picture.
///
/// The first non-empty file field is stored at
/// `profile-pics/{uid}/{millis}.jpg`; the previous picture is deleted when it
/// lives in our blob store.
#[instrument(skip(state, session, user, multipart), fields(user_id = %user.id))]
pub async fn upload_picture(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if field.name() != Some("picture") {
            continue;
        }
        if !is_image {
            set_flash(&session, Flash::error("Please choose an image file")).await;
            return Ok(Redirect::to("/account"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if !data.is_empty() {
            bytes = Some(data);
            break;
        }
    }

    let Some(bytes) = bytes else {
        set_flash(&session, Flash::error("Please choose an image file")).await;
        return Ok(Redirect::to("/account"));
    };

    let doc = load_user(&state, &user).await?;
    let path = profile_picture_path(user.id.as_str(), Utc::now().timestamp_millis());
    let url = state.blobs().upload(&path, &bytes).await?;

    UserDocumentRepository::new(state.pool())
        .save_profile_pic(&user.id, &url)
        .await?;

    if let Some(old_path) = state.blobs().path_from_url(&doc.profile_pic) {
        match state.blobs().delete(&old_path).await {
            Ok(()) | Err(BlobError::NotFound(_)) => {}
            Err(e) => {
                tracing::warn!(path = %old_path, "Failed to delete old profile picture: {}", e);
            }
        }
    }

    add_breadcrumb("account", "Profile picture updated", None);
    set_flash(&session, Flash::success("Profile picture updated")).await;
    Ok(Redirect::to("/account"))
}

// =============================================================================
// Address and Card Routes
// =============================================================================

/// Add a delivery address.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn add_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Redirect, AppError> {
    let address = match Address::new(
        &form.name,
        &form.city,
        &form.state,
        &form.zipcode,
        &form.mobile,
    ) {
        Ok(address) => address,
        Err(e) => {
            set_flash(&session, Flash::error(capitalize(&e.to_string()))).await;
            return Ok(Redirect::to("/account"));
        }
    };

    let mut doc = load_user(&state, &user).await?;
    doc.addresses.push(address);
    UserDocumentRepository::new(state.pool())
        .save_addresses(&user.id, &doc.addresses)
        .await?;

    set_flash(&session, Flash::success("Address saved")).await;
    Ok(Redirect::to("/account"))
}

/// Remove a delivery address by position.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    let mut doc = load_user(&state, &user).await?;
    if !doc.remove_address(index) {
        return Err(AppError::NotFound("address".to_owned()));
    }
    UserDocumentRepository::new(state.pool())
        .save_addresses(&user.id, &doc.addresses)
        .await?;

    set_flash(&session, Flash::success("Address removed")).await;
    Ok(Redirect::to("/account"))
}

/// Add a payment card.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn add_card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CardForm>,
) -> Result<Redirect, AppError> {
    let card = match Card::new(&form.number, &form.name, &form.expiry) {
        Ok(card) => card,
        Err(e) => {
            set_flash(&session, Flash::error(capitalize(&e.to_string()))).await;
            return Ok(Redirect::to("/account"));
        }
    };

    let mut doc = load_user(&state, &user).await?;
    doc.cards.push(card);
    UserDocumentRepository::new(state.pool())
        .save_cards(&user.id, &doc.cards)
        .await?;

    set_flash(&session, Flash::success("Card saved")).await;
    Ok(Redirect::to("/account"))
}

/// Remove a payment card by position.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn delete_card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    let mut doc = load_user(&state, &user).await?;
    if !doc.remove_card(index) {
        return Err(AppError::NotFound("card".to_owned()));
    }
    UserDocumentRepository::new(state.pool())
        .save_cards(&user.id, &doc.cards)
        .await?;

    set_flash(&session, Flash::success("Card removed")).await;
    Ok(Redirect::to("/account"))
}

// =============================================================================
// Order Routes
// =============================================================================

/// Display order history.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_user(&state, &user).await?;

    Ok(OrdersTemplate {
        layout: Layout::load(&session, Some(user)).await,
        sections: section_links(None),
        orders: order_history(&doc),
    })
}

/// Cancel an order that is not already cancelled.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn cancel_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<OrderActionForm>,
) -> Result<Redirect, AppError> {
    let order_id = OrderId::new(form.order_id);
    let mut doc = load_user(&state, &user).await?;

    match doc.cancel_order(&order_id) {
        Ok(()) => {
            UserDocumentRepository::new(state.pool())
                .save_orders(&user.id, &doc.orders)
                .await?;
            tracing::info!(order_id = %order_id, "order cancelled by shopper");
            set_flash(&session, Flash::success("Order cancelled")).await;
        }
        Err(e) => set_flash(&session, Flash::error(capitalize(&e.to_string()))).await,
    }

    Ok(Redirect::to("/account/orders"))
}

/// Remove a cancelled order from the history.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn remove_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<OrderActionForm>,
) -> Result<Redirect, AppError> {
    let order_id = OrderId::new(form.order_id);
    let mut doc = load_user(&state, &user).await?;

    match doc.remove_cancelled_order(&order_id) {
        Ok(()) => {
            UserDocumentRepository::new(state.pool())
                .save_orders(&user.id, &doc.orders)
                .await?;
            set_flash(&session, Flash::success("Order removed")).await;
        }
        Err(e) => set_flash(&session, Flash::error(capitalize(&e.to_string()))).await,
    }

    Ok(Redirect::to("/account/orders"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use nexura_core::{Cart, CartSummary, PaymentMethod, ProductId, UserId};

    use super::*;

    fn place(doc: &mut UserDocument, at: chrono::DateTime<Utc>) -> OrderId {
        let mut cart = Cart::default();
        cart.add(ProductId::new("p1"), 1, None, None);
        let address = Address::new("Home", "Pune", "MH", "411001", "9999999999").unwrap();
        let order = Order::place(
            &cart,
            &CartSummary::default(),
            Some(address),
            PaymentMethod::CashOnDelivery,
            None,
            at,
        )
        .unwrap();
        let id = order.order_id.clone();
        doc.record_order(order);
        id
    }

    #[test]
    fn test_order_history_is_newest_first_with_actions() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let mut doc = UserDocument::new(UserId::new("u1"), "A", "a@example.com", "", start);
        let first = place(&mut doc, start);
        let second = place(&mut doc, start + Duration::days(1));
        doc.cancel_order(&first).unwrap();

        let history = order_history(&doc);
        assert_eq!(history[0].order_id, second.to_string());
        assert!(history[0].can_cancel);
        assert!(!history[0].can_remove);
        assert_eq!(history[1].status, "Cancelled");
        assert!(history[1].can_remove);
    }
}
