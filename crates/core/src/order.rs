//! Orders and checkout.
//!
//! Orders are embedded in the owning user document; there is no separate
//! orders collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::pricing::CartSummary;
use crate::profile::{Address, Card};
use crate::types::{OrderId, OrderStatus, Price, ProductId};

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    CashOnDelivery,
    Card,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "COD",
            Self::Card => "Card",
        }
    }

    /// Parse a form value; anything other than `card` means cash on delivery.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("card") {
            Self::Card
        } else {
            Self::CashOnDelivery
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a checkout or order change is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,
    #[error("please select a delivery address")]
    MissingAddress,
    #[error("please select a card or choose cash on delivery")]
    MissingCard,
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order {0} is already cancelled")]
    AlreadyCancelled(OrderId),
    #[error("only cancelled orders can be removed")]
    NotCancelled(OrderId),
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub price: Price,
    /// Quantity per product.
    #[serde(default)]
    pub products: BTreeMap<ProductId, u32>,
    /// Total units across all products.
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub card: Option<Card>,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Place an order for the current cart.
    ///
    /// Requires a non-empty cart, a selected address, and a selected card
    /// when paying by card. The new order starts in `Pre-order`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart`, `MissingAddress`, or
    /// `MissingCard`.
    pub fn place(
        cart: &Cart,
        summary: &CartSummary,
        address: Option<Address>,
        payment_method: PaymentMethod,
        card: Option<Card>,
        now: DateTime<Utc>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let address = address.ok_or(CheckoutError::MissingAddress)?;
        let card = match payment_method {
            PaymentMethod::Card => Some(card.ok_or(CheckoutError::MissingCard)?),
            PaymentMethod::CashOnDelivery => None,
        };

        let products: BTreeMap<ProductId, u32> = cart
            .iter()
            .map(|(id, entry)| (id.clone(), entry.quantity))
            .collect();

        Ok(Self {
            order_id: OrderId::generate(),
            price: summary.total.rounded(),
            quantity: cart.total_items(),
            products,
            status: OrderStatus::PreOrder,
            payment_method,
            address: Some(address),
            card,
            timestamp: now,
        })
    }

    /// Shoppers may cancel anything not already cancelled.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        !self.status.is_cancelled()
    }

    /// Shoppers may only remove cancelled orders from their history.
    #[must_use]
    pub const fn can_remove(&self) -> bool {
        self.status.is_cancelled()
    }

    /// Placement date as `DD/MM/YYYY`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.timestamp.format("%d/%m/%Y").to_string()
    }

    /// Placement time as `HH:MM:SS AM`.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format("%I:%M:%S %p").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::pricing::CartLine;

    fn cart_with(items: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::default();
        for (id, qty) in items {
            cart.add(ProductId::new(*id), *qty, None, None);
        }
        cart
    }

    fn address() -> Address {
        Address::new("Asha", "Pune", "MH", "411001", "9876543210").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 15, 6, 7).unwrap()
    }

    #[test]
    fn test_place_cod_order() {
        let cart = cart_with(&[("a", 2), ("b", 1)]);
        let summary = CartSummary::compute([CartLine {
            unit_price: Price::from_rupees(100),
            quantity: 3,
            discount: crate::pricing::Discount::None,
        }]);
        let order = Order::place(
            &cart,
            &summary,
            Some(address()),
            PaymentMethod::CashOnDelivery,
            None,
            now(),
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::PreOrder);
        assert_eq!(order.quantity, 3);
        assert_eq!(order.products.get(&ProductId::new("a")), Some(&2));
        assert_eq!(order.price, summary.total);
        assert!(order.card.is_none());
        assert!(order.order_id.as_str().starts_with('#'));
    }

    #[test]
    fn test_place_with_large_quantities() {
        let cart = cart_with(&[("a", u32::MAX), ("b", 1)]);
        let order = Order::place(
            &cart,
            &CartSummary::default(),
            Some(address()),
            PaymentMethod::CashOnDelivery,
            None,
            now(),
        )
        .unwrap();
        assert_eq!(order.quantity, crate::cart::MAX_QUANTITY + 1);
    }

    #[test]
    fn test_place_requires_address_and_card() {
        let cart = cart_with(&[("a", 1)]);
        let summary = CartSummary::default();
        assert_eq!(
            Order::place(&cart, &summary, None, PaymentMethod::CashOnDelivery, None, now()),
            Err(CheckoutError::MissingAddress)
        );
        assert_eq!(
            Order::place(&cart, &summary, Some(address()), PaymentMethod::Card, None, now()),
            Err(CheckoutError::MissingCard)
        );
        assert_eq!(
            Order::place(
                &Cart::default(),
                &summary,
                Some(address()),
                PaymentMethod::CashOnDelivery,
                None,
                now()
            ),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_labels() {
        let cart = cart_with(&[("a", 1)]);
        let order = Order::place(
            &cart,
            &CartSummary::default(),
            Some(address()),
            PaymentMethod::CashOnDelivery,
            None,
            now(),
        )
        .unwrap();
        assert_eq!(order.date_label(), "04/03/2026");
        assert_eq!(order.time_label(), "03:06:07 PM");
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"COD\""
        );
        assert_eq!(PaymentMethod::from_form("CARD"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from_form(""), PaymentMethod::CashOnDelivery);
    }
}
