//! The user document.
//!
//! One document per account in the `users` collection. Addresses, cards,
//! favorites, the cart, and orders all live inside it, so each mutation below
//! is followed by a write of the affected field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::favorites::Favorites;
use crate::order::{CheckoutError, Order};
use crate::profile::{Address, Card};
use crate::types::{OrderId, OrderStatus, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDocument {
    /// Document ID (the account ID). Not part of the stored body.
    #[serde(skip)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
    pub bio: String,
    pub created_at: Option<DateTime<Utc>>,
    pub addresses: Vec<Address>,
    pub cards: Vec<Card>,
    pub favorites: Favorites,
    pub cart: Cart,
    pub orders: Vec<Order>,
}

impl UserDocument {
    /// A fresh document for a new account.
    #[must_use]
    pub fn new(id: UserId, name: &str, email: &str, photo_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            profile_pic: photo_url.to_owned(),
            created_at: Some(now),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.order_id == order_id)
    }

    fn order_mut(&mut self, order_id: &OrderId) -> Result<&mut Order, CheckoutError> {
        self.orders
            .iter_mut()
            .find(|o| &o.order_id == order_id)
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }

    /// Append a placed order and empty the cart.
    pub fn record_order(&mut self, order: Order) {
        self.orders.push(order);
        self.cart.clear();
    }

    /// Shopper-initiated cancellation.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` or `AlreadyCancelled`.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Result<(), CheckoutError> {
        let order = self.order_mut(order_id)?;
        if !order.can_cancel() {
            return Err(CheckoutError::AlreadyCancelled(order_id.clone()));
        }
        order.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Shopper-initiated removal from history; only cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` or `NotCancelled`.
    pub fn remove_cancelled_order(&mut self, order_id: &OrderId) -> Result<(), CheckoutError> {
        if !self.order_mut(order_id)?.can_remove() {
            return Err(CheckoutError::NotCancelled(order_id.clone()));
        }
        self.orders.retain(|o| &o.order_id != order_id);
        Ok(())
    }

    /// Admin status change. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound`.
    pub fn set_order_status(
        &mut self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), CheckoutError> {
        self.order_mut(order_id)?.status = status;
        Ok(())
    }

    /// Admin deletion; no status requirement.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound`.
    pub fn delete_order(&mut self, order_id: &OrderId) -> Result<(), CheckoutError> {
        let before = self.orders.len();
        self.orders.retain(|o| &o.order_id != order_id);
        if self.orders.len() == before {
            return Err(CheckoutError::OrderNotFound(order_id.clone()));
        }
        Ok(())
    }

    /// Remove a saved address by position.
    pub fn remove_address(&mut self, index: usize) -> bool {
        if index < self.addresses.len() {
            self.addresses.remove(index);
            true
        } else {
            false
        }
    }

    /// Remove a saved card by position.
    pub fn remove_card(&mut self, index: usize) -> bool {
        if index < self.cards.len() {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.split('@').next().unwrap_or("")
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::PaymentMethod;
    use crate::pricing::CartSummary;
    use crate::types::ProductId;

    fn user_with_order() -> (UserDocument, OrderId) {
        let mut user = UserDocument::new(
            UserId::new("u1"),
            "Asha",
            "asha@example.com",
            "",
            Utc::now(),
        );
        user.cart.add(ProductId::new("p1"), 2, None, None);
        let order = Order::place(
            &user.cart,
            &CartSummary::default(),
            Some(Address::new("Asha", "Pune", "MH", "411001", "98").unwrap()),
            PaymentMethod::CashOnDelivery,
            None,
            Utc::now(),
        )
        .unwrap();
        let id = order.order_id.clone();
        user.record_order(order);
        (user, id)
    }

    #[test]
    fn test_record_order_clears_cart() {
        let (user, id) = user_with_order();
        assert!(user.cart.is_empty());
        assert!(user.order(&id).is_some());
    }

    #[test]
    fn test_cancel_then_remove() {
        let (mut user, id) = user_with_order();
        assert_eq!(
            user.remove_cancelled_order(&id),
            Err(CheckoutError::NotCancelled(id.clone()))
        );
        user.cancel_order(&id).unwrap();
        assert_eq!(
            user.cancel_order(&id),
            Err(CheckoutError::AlreadyCancelled(id.clone()))
        );
        user.remove_cancelled_order(&id).unwrap();
        assert!(user.orders.is_empty());
    }

    #[test]
    fn test_admin_status_has_no_transition_rules() {
        let (mut user, id) = user_with_order();
        user.set_order_status(&id, OrderStatus::Cancelled).unwrap();
        user.set_order_status(&id, OrderStatus::PreOrder).unwrap();
        user.set_order_status(&id, OrderStatus::Confirmed).unwrap();
        assert_eq!(user.order(&id).unwrap().status, OrderStatus::Confirmed);
        assert!(user.set_order_status(&OrderId::new("#NOPE"), OrderStatus::Confirmed).is_err());
    }

    #[test]
    fn test_admin_delete_ignores_status() {
        let (mut user, id) = user_with_order();
        user.delete_order(&id).unwrap();
        assert!(user.delete_order(&id).is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let user: UserDocument =
            serde_json::from_value(serde_json::json!({"name": "Ravi", "email": "r@x.in"}))
                .unwrap();
        assert!(user.orders.is_empty());
        assert!(user.cart.is_empty());
        assert_eq!(user.display_name(), "Ravi");
    }

    #[test]
    fn test_remove_address_and_card_by_index() {
        let mut user = UserDocument::default();
        user.addresses
            .push(Address::new("A", "B", "C", "D", "E").unwrap());
        assert!(!user.remove_address(3));
        assert!(user.remove_address(0));
        assert!(!user.remove_card(0));
    }
}
