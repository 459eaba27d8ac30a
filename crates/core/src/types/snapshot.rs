//! Ordered cart contents and the transitions that mutate them.
//!
//! A [`CartSnapshot`] is a plain value. All state transitions live here as
//! pure methods so the store layer only has to decide *when* to apply them
//! and what to do with the result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};

use super::line_item::LineItem;
use super::price::Price;
use super::product::{ProductDescriptor, ProductId};

/// Errors raised when building a snapshot from untrusted data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Two lines share the same product ID.
    #[error("duplicate product id in cart: {0}")]
    DuplicateId(ProductId),
}

/// The ordered contents of a cart.
///
/// Lines keep the order in which their products were first added, and no two
/// lines share a [`ProductId`]. Every line holds at least one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct CartSnapshot {
    items: Vec<LineItem>,
}

impl CartSnapshot {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a snapshot from existing lines.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateId`] if two lines share an ID.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(SnapshotError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .fold(Price::ZERO, |acc, item| acc.saturating_add(item.line_total()))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id.as_str() == id)
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// its title, image and price are replaced with `product`'s. Otherwise a
    /// new line is appended.
    pub fn add(&mut self, product: &ProductDescriptor) {
        if let Some(line) = self.get_mut(product.id.as_str()) {
            line.refresh(product);
            line.increment();
        } else {
            self.items.push(LineItem::single(product.clone()));
        }
    }

    /// Add one unit to an existing line. Returns `false` if `id` is not in the cart.
    pub fn increment(&mut self, id: &str) -> bool {
        self.get_mut(id).map(LineItem::increment).is_some()
    }

    /// Remove one unit from an existing line, dropping the line when its last
    /// unit goes. Returns `false` if `id` is not in the cart.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(pos) = self.items.iter().position(|item| item.id.as_str() == id) else {
            return false;
        };
        let emptied = self
            .items
            .get_mut(pos)
            .is_some_and(|line| line.decrement().is_none());
        if emptied {
            self.items.remove(pos);
        }
        true
    }

    /// Drop a line regardless of its quantity. Returns `false` if `id` is not in the cart.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id.as_str() != id);
        self.items.len() != before
    }

    /// Empty the cart. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }
}

impl TryFrom<Vec<LineItem>> for CartSnapshot {
    type Error = SnapshotError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl Serialize for CartSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a CartSnapshot {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, title: &str, cents: i64) -> ProductDescriptor {
        ProductDescriptor::new(
            ProductId::parse(id).unwrap(),
            title,
            format!("https://img.example/{id}.png"),
            Price::from_cents(cents).unwrap(),
        )
    }

    fn quantities(cart: &CartSnapshot) -> Vec<(&str, u32)> {
        cart.iter()
            .map(|item| (item.id.as_str(), item.quantity.get()))
            .collect()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        assert_eq!(quantities(&cart), vec![("A", 1)]);
    }

    #[test]
    fn test_add_twice_increments() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("A", "Shoe", 1000));
        assert_eq!(quantities(&cart), vec![("A", 2)]);
    }

    #[test]
    fn test_add_again_overwrites_display_fields() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("A", "Running Shoe", 1200));
        let line = cart.get("A").unwrap();
        assert_eq!(line.title, "Running Shoe");
        assert_eq!(line.price, Price::from_cents(1200).unwrap());
        assert_eq!(line.quantity.get(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("B", "Hat", 500));
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("B", "Hat", 500));
        assert_eq!(quantities(&cart), vec![("B", 2), ("A", 1)]);
    }

    #[test]
    fn test_decrement_removes_last_unit() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("B", "Hat", 500));
        assert!(cart.decrement("A"));
        assert!(cart.get("A").is_none());
        assert_eq!(quantities(&cart), vec![("B", 1)]);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.increment("A");
        assert!(cart.decrement("A"));
        assert_eq!(quantities(&cart), vec![("A", 1)]);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        let before = cart.clone();
        assert!(!cart.increment("missing"));
        assert!(!cart.decrement("missing"));
        assert!(!cart.remove("missing"));
        assert_eq!(cart, before);
        assert_eq!(
            serde_json::to_string(&cart).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("B", "Hat", 500));
        assert!(cart.remove("A"));
        assert_eq!(quantities(&cart), vec![("B", 1)]);
        assert!(cart.clear());
        assert!(cart.is_empty());
        assert!(!cart.clear());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("A", "Shoe", 1000));
        cart.add(&product("B", "Hat", 250));
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2250).unwrap());
    }

    #[test]
    fn test_scenario_add_increment_decrement() {
        let mut cart = CartSnapshot::new();
        let shoe = product("A", "Shoe", 1000);
        cart.add(&shoe);
        assert_eq!(quantities(&cart), vec![("A", 1)]);
        cart.add(&shoe);
        assert_eq!(quantities(&cart), vec![("A", 2)]);
        cart.increment("A");
        assert_eq!(quantities(&cart), vec![("A", 3)]);
        for _ in 0..3 {
            assert!(cart.decrement("A"));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mut cart = CartSnapshot::new();
        cart.add(&product("B", "Hat", 499));
        cart.add(&product("A", "Shoe", 1000));
        cart.increment("A");

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));
        let parsed: CartSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cart);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let raw = r#"[
            {"id":"A","title":"Shoe","image_url":"","price":10,"quantity":1},
            {"id":"A","title":"Shoe","image_url":"","price":10,"quantity":2}
        ]"#;
        assert!(serde_json::from_str::<CartSnapshot>(raw).is_err());
        let items: Vec<LineItem> = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            CartSnapshot::from_items(items),
            Err(SnapshotError::DuplicateId(_))
        ));
    }
}
