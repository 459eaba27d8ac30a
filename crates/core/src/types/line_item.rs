//! A single product's presence in the cart.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::price::Price;
use super::product::{ProductDescriptor, ProductId};

/// One cart line.
///
/// `quantity` is a [`NonZeroU32`], so a line with zero units cannot be
/// represented; decrementing the last unit removes the line from the
/// snapshot instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    pub quantity: NonZeroU32,
}

impl LineItem {
    /// A new line with a single unit of `product`.
    #[must_use]
    pub fn single(product: ProductDescriptor) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Price of the whole line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }

    /// Overwrite display fields with `product`'s, keeping the quantity.
    pub(crate) fn refresh(&mut self, product: &ProductDescriptor) {
        self.title.clone_from(&product.title);
        self.image_url.clone_from(&product.image_url);
        self.price = product.price;
    }

    /// Add one unit.
    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Remove one unit. Returns `None` when the last unit was removed.
    pub(crate) fn decrement(&mut self) -> Option<()> {
        self.quantity = NonZeroU32::new(self.quantity.get() - 1)?;
        Some(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shoe() -> ProductDescriptor {
        ProductDescriptor::new(
            ProductId::parse("A").unwrap(),
            "Shoe",
            "https://img.example/shoe.png",
            Price::from_cents(1000).unwrap(),
        )
    }

    #[test]
    fn test_single_has_quantity_one() {
        let line = LineItem::single(shoe());
        assert_eq!(line.quantity.get(), 1);
        assert_eq!(line.line_total(), Price::from_cents(1000).unwrap());
    }

    #[test]
    fn test_decrement_last_unit() {
        let mut line = LineItem::single(shoe());
        line.increment();
        assert_eq!(line.decrement(), Some(()));
        assert_eq!(line.quantity.get(), 1);
        assert_eq!(line.decrement(), None);
        assert_eq!(line.quantity.get(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let line = LineItem::single(shoe());
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["image_url"], "https://img.example/shoe.png");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let raw = r#"{"id":"A","title":"Shoe","image_url":"","price":10,"quantity":0}"#;
        assert!(serde_json::from_str::<LineItem>(raw).is_err());
    }
}
