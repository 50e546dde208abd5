//! Shopping cart.
//!
//! The cart lives in the user document as a map from product ID to
//! [`CartEntry`]. Each mutation here is followed by a full write of that
//! field.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::ProductId;

/// Color recorded when the shopper did not pick one.
pub const DEFAULT_COLOR: &str = "defaultColor";

/// Size recorded when the shopper did not pick one.
pub const DEFAULT_SIZE: &str = "40.5";

/// Most units of one product a cart entry can hold.
pub const MAX_QUANTITY: u32 = 99;

/// Quantity and selected variant for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub quantity: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_size", deserialize_with = "size_from_string_or_number")]
    pub size: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

fn default_size() -> String {
    DEFAULT_SIZE.to_owned()
}

/// Older documents stored sizes as numbers (`40.5`); accept both.
fn size_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Text(String),
        Number(f64),
    }

    Ok(match Size::deserialize(deserializer)? {
        Size::Text(s) => s,
        Size::Number(n) => n.to_string(),
    })
}

/// A user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<ProductId, CartEntry>);

impl Cart {
    /// Add `quantity` units of a product.
    ///
    /// A zero quantity is ignored. An existing entry is incremented and its
    /// color/size replaced only when new values are given; a new entry uses
    /// [`DEFAULT_COLOR`] and [`DEFAULT_SIZE`] for anything missing. Quantities
    /// are capped at [`MAX_QUANTITY`].
    ///
    /// Returns `false` when nothing changed.
    pub fn add(
        &mut self,
        product: ProductId,
        quantity: u32,
        color: Option<String>,
        size: Option<String>,
    ) -> bool {
        if quantity == 0 {
            return false;
        }

        let color = color.filter(|c| !c.trim().is_empty());
        let size = size.filter(|s| !s.trim().is_empty());

        match self.0.entry(product) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.quantity = entry.quantity.saturating_add(quantity).min(MAX_QUANTITY);
                if let Some(color) = color {
                    entry.color = color;
                }
                if let Some(size) = size {
                    entry.size = size;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CartEntry {
                    quantity: quantity.min(MAX_QUANTITY),
                    color: color.unwrap_or_else(default_color),
                    size: size.unwrap_or_else(default_size),
                });
            }
        }
        true
    }

    /// Set an entry's quantity, keeping its color and size. Zero removes it;
    /// anything above [`MAX_QUANTITY`] is capped.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn update_quantity(&mut self, product: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product);
        }
        self.0.get_mut(product).is_some_and(|entry| {
            entry.quantity = quantity.min(MAX_QUANTITY);
            true
        })
    }

    /// Remove an entry. Returns whether it was present.
    pub fn remove(&mut self, product: &ProductId) -> bool {
        self.0.remove(product).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Total number of units across all entries (the cart badge).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        sum_quantities(self.0.values().map(|e| e.quantity))
    }

    #[must_use]
    pub fn get(&self, product: &ProductId) -> Option<&CartEntry> {
        self.0.get(product)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &CartEntry)> {
        self.0.iter()
    }
}

/// Sum quantities without overflowing on documents written before the cap.
fn sum_quantities(quantities: impl IntoIterator<Item = u32>) -> u32 {
    quantities.into_iter().fold(0, u32::saturating_add)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_add_new_entry_uses_defaults() {
        let mut cart = Cart::default();
        assert!(cart.add(pid("p1"), 1, None, None));
        let entry = cart.get(&pid("p1")).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.color, DEFAULT_COLOR);
        assert_eq!(entry.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_add_existing_increments_instead_of_duplicating() {
        let mut cart = Cart::default();
        cart.add(pid("p1"), 1, Some("red".into()), Some("42".into()));
        cart.add(pid("p1"), 2, None, Some("43".into()));
        assert_eq!(cart.len(), 1);
        let entry = cart.get(&pid("p1")).unwrap();
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.color, "red");
        assert_eq!(entry.size, "43");
    }

    #[test]
    fn test_add_zero_is_ignored() {
        let mut cart = Cart::default();
        assert!(!cart.add(pid("p1"), 0, None, None));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::default();
        cart.add(pid("p1"), 1, Some("blue".into()), None);
        assert!(cart.update_quantity(&pid("p1"), 5));
        assert_eq!(cart.get(&pid("p1")).unwrap().quantity, 5);
        assert_eq!(cart.get(&pid("p1")).unwrap().color, "blue");
        assert!(!cart.update_quantity(&pid("missing"), 2));
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = Cart::default();
        cart.add(pid("p1"), 2, None, None);
        assert!(cart.update_quantity(&pid("p1"), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_items_and_clear() {
        let mut cart = Cart::default();
        cart.add(pid("a"), 2, None, None);
        cart.add(pid("b"), 3, None, None);
        assert_eq!(cart.total_items(), 5);
        cart.clear();
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_quantities_are_capped() {
        let mut cart = Cart::default();
        cart.add(pid("a"), u32::MAX, None, None);
        cart.add(pid("a"), 5, None, None);
        cart.add(pid("b"), u32::MAX, None, None);
        cart.add(pid("c"), 1, None, None);
        assert!(cart.update_quantity(&pid("c"), u32::MAX));
        assert_eq!(cart.get(&pid("a")).unwrap().quantity, MAX_QUANTITY);
        assert_eq!(cart.total_items(), 3 * MAX_QUANTITY);
    }

    #[test]
    fn test_total_items_saturates_on_stored_quantities() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "a": {"quantity": u32::MAX},
            "b": {"quantity": 1}
        }))
        .unwrap();
        assert_eq!(cart.total_items(), u32::MAX);
    }

    #[test]
    fn test_deserialize_numeric_size() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "p1": {"quantity": 2, "color": "red", "size": 40.5}
        }))
        .unwrap();
        assert_eq!(cart.get(&pid("p1")).unwrap().size, "40.5");
    }
}
