//! Orders across every user document.
//!
//! Orders are embedded in user documents, so the admin order list is built
//! by walking all users and tagging each order with its owner.

use nexura_core::{Order, OrderStatus, UserDocument, UserId};

/// An order with the user it belongs to.
#[derive(Debug, Clone)]
pub struct AdminOrder {
    pub user_id: UserId,
    pub user_name: String,
    pub invoice_date: String,
    pub order: Order,
}

/// Every order of every user, in user order and then placement order.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Vec<AdminOrder>,
}

impl OrderBook {
    /// Flatten the orders of `users`.
    #[must_use]
    pub fn from_users(users: &[UserDocument]) -> Self {
        let orders = users
            .iter()
            .flat_map(|user| {
                user.orders.iter().map(|order| AdminOrder {
                    user_id: user.id.clone(),
                    user_name: user.display_name().to_owned(),
                    invoice_date: order.date_label(),
                    order: order.clone(),
                })
            })
            .collect();
        Self { orders }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders with `status`, or all orders when `status` is `None`.
    #[must_use]
    pub fn with_status(&self, status: Option<OrderStatus>) -> Vec<&AdminOrder> {
        self.orders
            .iter()
            .filter(|o| status.is_none_or(|s| o.order.status == s))
            .collect()
    }

    /// Number of orders in each status, in [`OrderStatus::ALL`] order.
    #[must_use]
    pub fn status_counts(&self) -> Vec<(OrderStatus, usize)> {
        OrderStatus::ALL
            .into_iter()
            .map(|status| {
                let count = self
                    .orders
                    .iter()
                    .filter(|o| o.order.status == status)
                    .count();
                (status, count)
            })
            .collect()
    }

    /// The `limit` most recently placed orders, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&AdminOrder> {
        let mut orders: Vec<&AdminOrder> = self.orders.iter().collect();
        orders.sort_by(|a, b| b.order.timestamp.cmp(&a.order.timestamp));
        orders.truncate(limit);
        orders
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use nexura_core::{Address, Cart, CartSummary, PaymentMethod, ProductId};

    use super::*;

    fn order_at(hours: i64, status: OrderStatus) -> Order {
        let mut cart = Cart::default();
        cart.add(ProductId::new("p1"), 1, None, None);
        let placed = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap() + Duration::hours(hours);
        let mut order = Order::place(
            &cart,
            &CartSummary::default(),
            Some(Address::new("Asha", "Pune", "MH", "411001", "9800000000").unwrap()),
            PaymentMethod::CashOnDelivery,
            None,
            placed,
        )
        .unwrap();
        order.status = status;
        order
    }

    fn user(id: &str, name: &str, orders: Vec<Order>) -> UserDocument {
        let mut user = UserDocument::new(UserId::new(id), name, "a@nexura.in", "", Utc::now());
        user.orders = orders;
        user
    }

    fn book() -> OrderBook {
        OrderBook::from_users(&[
            user(
                "u1",
                "Asha",
                vec![
                    order_at(0, OrderStatus::PreOrder),
                    order_at(30, OrderStatus::Cancelled),
                ],
            ),
            user("u2", "", vec![order_at(5, OrderStatus::InTransit)]),
            user("u3", "Dev", vec![]),
        ])
    }

    #[test]
    fn test_flattens_orders_with_owner() {
        let book = book();
        assert_eq!(book.len(), 3);

        let all = book.with_status(None);
        assert_eq!(all.first().unwrap().user_id.as_str(), "u1");
        assert_eq!(all.first().unwrap().user_name, "Asha");
        assert_eq!(all.first().unwrap().invoice_date, "05/03/2024");
        // Blank names fall back to the email's local part
        assert_eq!(all.get(2).unwrap().user_name, "a");
    }

    #[test]
    fn test_status_filter() {
        let book = book();
        let cancelled = book.with_status(Some(OrderStatus::Cancelled));
        assert_eq!(cancelled.len(), 1);
        assert!(book.with_status(Some(OrderStatus::Confirmed)).is_empty());

        let counts = book.status_counts();
        assert_eq!(counts.first(), Some(&(OrderStatus::PreOrder, 1)));
        assert_eq!(counts.get(2), Some(&(OrderStatus::Confirmed, 0)));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let book = book();
        let recent = book.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().unwrap().order.status, OrderStatus::Cancelled);
        assert_eq!(recent.get(1).unwrap().order.status, OrderStatus::InTransit);
    }
}
