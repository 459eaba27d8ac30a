//! Ambient access to a cart for code that cannot take it as a parameter.
//!
//! Prefer passing an `Arc<CartStore<_>>` explicitly. When a call tree was
//! written against an ambient cart instead, wrap it in [`provide_cart`] and
//! have the leaves call [`use_cart`]. The cart is scoped to the task running
//! the wrapped future; outside such a scope `use_cart` fails with
//! [`CartError::ContextUnavailable`].

use std::future::Future;
use std::sync::Arc;

use go_marketplace_core::{CartSnapshot, ProductDescriptor};

use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;
use crate::store::CartStore;

/// The cart operations available to UI-facing code.
pub trait CartContext: Send + Sync {
    /// The current cart.
    fn products(&self) -> Arc<CartSnapshot>;

    /// Add one unit of `product`.
    fn add_to_cart(&self, product: &ProductDescriptor);

    /// Add one unit to the line for `id`, if present.
    fn increment(&self, id: &str) -> bool;

    /// Remove one unit from the line for `id`, if present.
    fn decrement(&self, id: &str) -> bool;
}

impl<S: KeyValueStore> CartContext for CartStore<S> {
    fn products(&self) -> Arc<CartSnapshot> {
        Self::products(self)
    }

    fn add_to_cart(&self, product: &ProductDescriptor) {
        Self::add_to_cart(self, product);
    }

    fn increment(&self, id: &str) -> bool {
        Self::increment(self, id)
    }

    fn decrement(&self, id: &str) -> bool {
        Self::decrement(self, id)
    }
}

tokio::task_local! {
    static CART: Arc<dyn CartContext>;
}

/// Run `f` with `cart` available through [`use_cart`].
pub async fn provide_cart<F: Future>(cart: Arc<dyn CartContext>, f: F) -> F::Output {
    CART.scope(cart, f).await
}

/// Run the synchronous closure `f` with `cart` available through [`use_cart`].
pub fn provide_cart_sync<R>(cart: Arc<dyn CartContext>, f: impl FnOnce() -> R) -> R {
    CART.sync_scope(cart, f)
}

/// The cart of the enclosing [`provide_cart`] scope.
///
/// # Errors
///
/// Returns [`CartError::ContextUnavailable`] when called outside a provider scope.
pub fn use_cart() -> Result<Arc<dyn CartContext>> {
    CART.try_with(Arc::clone)
        .map_err(|_| CartError::ContextUnavailable)
}
