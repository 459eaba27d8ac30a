//! Go Marketplace Cart - Persistent cart state container.
//!
//! Holds the shopper's cart in memory, keeps a copy in key-value storage, and
//! exposes the operations UI code needs: read the cart, add a product, and
//! step a line's quantity up or down.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the current snapshot and applies every change as an
//!   atomic update to it
//! - A single background writer persists each new snapshot; callers never
//!   wait on storage
//! - [`KeyValueStore`] is the storage boundary, with [`MemoryStore`] and
//!   [`FileStore`] implementations
//! - [`provide_cart`] / [`use_cart`] give scoped ambient access for code that
//!   can't take the store as a parameter
//!
//! # Example
//!
//! ```
//! use go_marketplace_cart::{CartConfig, CartStore, MemoryStore};
//! use rust_decimal::Decimal;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), go_marketplace_cart::CartError> {
//! let cart = CartStore::open(MemoryStore::new(), &CartConfig::default()).await;
//!
//! cart.add_to_cart_raw("A", "Shoe", "shoe.png", Decimal::from(10))?;
//! cart.increment("A");
//! cart.flush().await;
//!
//! assert_eq!(cart.products().total_quantity(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
mod persist;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, DEFAULT_CART_KEY};
pub use error::{CartError, StorageError};
pub use provider::{CartContext, provide_cart, provide_cart_sync, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CartStore, LoadOutcome};
