//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod line_item;
pub mod price;
pub mod product;
pub mod snapshot;

pub use line_item::LineItem;
pub use price::Price;
pub use product::{ProductDescriptor, ProductError, ProductId};
pub use snapshot::{CartSnapshot, SnapshotError};
