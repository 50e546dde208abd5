//! Cart pricing.
//!
//! Totals are computed from the cart joined with the current product
//! documents every time the cart is shown; nothing here is persisted.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::cart::Cart;
use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Orders whose original price is at or below this pay [`PICKUP_FEE`].
pub const FREE_PICKUP_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat pickup fee for small, non-empty orders.
pub const PICKUP_FEE: Decimal = Decimal::from_parts(99, 0, 0, false, 0);

/// Tax rate applied to the original (pre-discount) price: 5%.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(\d+(\.\d+)?)").unwrap()
});

/// A product's discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discount {
    #[default]
    None,
    /// Percentage of the unit price, e.g. `10` for 10%.
    Percent(Decimal),
    /// Fixed amount off each unit.
    Flat(Decimal),
}

impl Discount {
    /// Parse a free-form discount string.
    ///
    /// The first number in the string is the amount. A `%` anywhere makes it
    /// a percentage; otherwise it is a flat amount per unit. Strings without
    /// a number carry no discount.
    ///
    /// ```
    /// use nexura_core::Discount;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Discount::parse("10% off"), Discount::Percent(Decimal::from(10)));
    /// assert_eq!(Discount::parse("Rs 150"), Discount::Flat(Decimal::from(150)));
    /// assert_eq!(Discount::parse(""), Discount::None);
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let Some(amount) = NUMBER
            .find(input)
            .and_then(|m| m.as_str().parse::<Decimal>().ok())
        else {
            return Self::None;
        };

        if input.contains('%') {
            Self::Percent(amount)
        } else {
            Self::Flat(amount)
        }
    }

    /// Amount taken off a single unit at `price`.
    #[must_use]
    pub fn per_unit(&self, price: Price) -> Price {
        match self {
            Self::None => Price::ZERO,
            Self::Percent(pct) => price * (*pct / Decimal::ONE_HUNDRED),
            Self::Flat(amount) => Price::new(*amount),
        }
    }

    /// Amount taken off `quantity` units at `price`.
    #[must_use]
    pub fn for_line(&self, price: Price, quantity: u32) -> Price {
        self.per_unit(price).times(quantity)
    }
}

/// One priced cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub unit_price: Price,
    pub quantity: u32,
    pub discount: Discount,
}

impl CartLine {
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            unit_price: product.price,
            quantity,
            discount: product.discount(),
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Price breakdown shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub items: u32,
    pub original: Price,
    pub discount: Price,
    pub pickup_fee: Price,
    pub tax: Price,
    pub total: Price,
}

impl CartSummary {
    /// Sum a set of cart lines.
    #[must_use]
    pub fn compute<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = CartLine>,
    {
        let mut summary = Self::default();
        for line in lines {
            summary.items = summary.items.saturating_add(line.quantity);
            summary.original = summary.original + line.line_total();
            summary.discount = summary.discount + line.discount.for_line(line.unit_price, line.quantity);
        }

        summary.pickup_fee = pickup_fee(summary.original);
        summary.tax = summary.original * TAX_RATE;
        summary.total = summary.original - summary.discount + summary.pickup_fee + summary.tax;
        summary
    }

    /// Price a cart against the products it references. Entries whose
    /// product no longer exists are skipped.
    #[must_use]
    pub fn for_cart<F>(cart: &Cart, mut lookup: F) -> Self
    where
        F: FnMut(&ProductId) -> Option<Product>,
    {
        Self::compute(cart.iter().filter_map(|(id, entry)| {
            lookup(id).map(|product| CartLine::from_product(&product, entry.quantity))
        }))
    }
}

/// Pickup fee for an original price.
#[must_use]
pub fn pickup_fee(original: Price) -> Price {
    let amount = original.amount();
    if amount > FREE_PICKUP_THRESHOLD || amount <= Decimal::ZERO {
        Price::ZERO
    } else {
        Price::new(PICKUP_FEE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: u32, discount: &str) -> CartLine {
        CartLine {
            unit_price: Price::from_rupees(price),
            quantity,
            discount: Discount::parse(discount),
        }
    }

    #[test]
    fn test_percent_discount_example() {
        let summary = CartSummary::compute([line(100, 2, "10%")]);
        assert_eq!(summary.original, Price::from_rupees(200));
        assert_eq!(summary.discount, Price::from_rupees(20));
        assert_eq!(summary.pickup_fee, Price::ZERO);
        assert_eq!(summary.tax, Price::from_rupees(10));
        assert_eq!(summary.total, Price::from_rupees(190));
        assert_eq!(summary.items, 2);
    }

    #[test]
    fn test_flat_discount_is_per_unit() {
        let summary = CartSummary::compute([line(500, 3, "50")]);
        assert_eq!(summary.discount, Price::from_rupees(150));
    }

    #[test]
    fn test_pickup_fee_thresholds() {
        assert_eq!(pickup_fee(Price::ZERO), Price::ZERO);
        assert_eq!(pickup_fee(Price::from_rupees(1)), Price::from_rupees(99));
        assert_eq!(pickup_fee(Price::from_rupees(50)), Price::from_rupees(99));
        assert_eq!(pickup_fee(Price::from_rupees(51)), Price::ZERO);
    }

    #[test]
    fn test_small_order_total() {
        // 40 + 99 fee + 2 tax
        let summary = CartSummary::compute([line(20, 2, "")]);
        assert_eq!(summary.total, Price::from_rupees(141));
    }

    #[test]
    fn test_item_count_saturates() {
        let summary = CartSummary::compute([line(1, u32::MAX, ""), line(1, 1, "")]);
        assert_eq!(summary.items, u32::MAX);
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let summary = CartSummary::compute(std::iter::empty());
        assert_eq!(summary, CartSummary::default());
    }

    #[test]
    fn test_discount_parse_variants() {
        assert_eq!(
            Discount::parse("12.5%"),
            Discount::Percent(Decimal::new(125, 1))
        );
        assert_eq!(Discount::parse("flat 30 off"), Discount::Flat(Decimal::from(30)));
        assert_eq!(Discount::parse("none"), Discount::None);
    }

    #[test]
    fn test_for_cart_skips_missing_products() {
        let mut cart = Cart::default();
        cart.add(ProductId::new("p1"), 2, None, None);
        cart.add(ProductId::new("gone"), 5, None, None);

        let summary = CartSummary::for_cart(&cart, |id| {
            (id.as_str() == "p1").then(|| Product {
                price: Price::from_rupees(100),
                discount: "10%".into(),
                ..Product::default()
            })
        });
        assert_eq!(summary.total, Price::from_rupees(190));
        assert_eq!(summary.items, 2);
    }
}
