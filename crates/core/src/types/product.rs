//! Product identity and descriptors.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// Errors that can occur when validating product input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product ID is empty.
    #[error("product id cannot be empty")]
    EmptyId,
    /// The price is below zero.
    #[error("price cannot be negative")]
    NegativePrice,
    /// The price could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// Stable identifier of a product in the cart.
///
/// Any non-empty string is accepted. Catalog ids are opaque, so stored
/// carts with unusual ids still load.
///
/// ## Examples
///
/// ```
/// use go_marketplace_core::ProductId;
///
/// assert!(ProductId::parse("sku-123").is_ok());
/// assert!(ProductId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn parse(s: &str) -> Result<Self, ProductError> {
        if s.is_empty() {
            return Err(ProductError::EmptyId);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A product as offered to the cart, without a quantity.
///
/// Holding a `ProductDescriptor` means its ID and price already passed
/// validation, so adding one to a cart cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl ProductDescriptor {
    /// Build a descriptor from already-validated parts.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Validate raw input and build a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid [`ProductId`] or `price` is negative.
    pub fn parse(
        id: &str,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: rust_decimal::Decimal,
    ) -> Result<Self, ProductError> {
        Ok(Self::new(
            ProductId::parse(id)?,
            title,
            image_url,
            Price::new(price)?,
        ))
    }
}
