//! Favorite products, stored inline in the user document as a list of IDs.
//!
//! The list keeps the order products were favorited in; new IDs go on the end.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<ProductId>);

impl Favorites {
    /// Remove the product if present, otherwise append it.
    ///
    /// Returns whether the product is a favorite afterwards.
    pub fn toggle(&mut self, product: &ProductId) -> bool {
        if self.contains(product) {
            self.0.retain(|id| id != product);
            false
        } else {
            self.0.push(product.clone());
            true
        }
    }

    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.0.contains(product)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ProductId> for Favorites {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(favorites: &Favorites) -> Vec<&str> {
        favorites.as_slice().iter().map(ProductId::as_str).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = Favorites::default();
        let id = ProductId::new("p1");
        assert!(favorites.toggle(&id));
        assert!(favorites.contains(&id));
        assert!(!favorites.toggle(&id));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle_appends_new_ids() {
        let mut favorites: Favorites = serde_json::from_str(r#"["c", "a"]"#).unwrap();
        assert!(favorites.toggle(&ProductId::new("b")));
        assert_eq!(ids(&favorites), ["c", "a", "b"]);
    }

    #[test]
    fn test_double_toggle_restores_stored_list() {
        let stored = r#"["c","a"]"#;
        let mut favorites: Favorites = serde_json::from_str(stored).unwrap();
        let id = ProductId::new("b");
        favorites.toggle(&id);
        favorites.toggle(&id);
        assert_eq!(serde_json::to_string(&favorites).unwrap(), stored);
    }

    #[test]
    fn test_deserialize_keeps_stored_order() {
        let favorites: Favorites = serde_json::from_str(r#"["b", "a"]"#).unwrap();
        assert_eq!(ids(&favorites), ["b", "a"]);
    }
}
