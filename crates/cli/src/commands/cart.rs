//! Cart commands against the local file-backed cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cli show
//!
//! # Add a product (adds one unit, or one more unit if already present)
//! gm-cli add --id sku-1 --title "Running Shoe" --price 59.90 --image-url https://cdn/shoe.png
//!
//! # Step a line's quantity
//! gm-cli increment sku-1
//! gm-cli decrement sku-1
//! ```
//!
//! # Environment Variables
//!
//! - `GO_MARKETPLACE_STORAGE_DIR` - Directory holding the cart file
//! - `GO_MARKETPLACE_CART_KEY` - Storage key of the cart

use go_marketplace_cart::{CartConfig, CartError, CartStore, ConfigError, FileStore, LoadOutcome};
use go_marketplace_core::{CartSnapshot, Price, ProductDescriptor, ProductError, ProductId};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart rejected the operation.
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl From<ProductError> for CommandError {
    fn from(err: ProductError) -> Self {
        Self::Cart(CartError::InvalidProduct(err))
    }
}

/// Open the cart configured by the environment.
async fn open() -> Result<CartStore<FileStore>, CommandError> {
    let config = CartConfig::from_env()?;
    let storage = FileStore::new(&config.storage_dir);
    let cart = CartStore::new(storage, &config);

    if let LoadOutcome::Recovered { error } = cart.load().await {
        warn!(
            dir = %config.storage_dir.display(),
            "Stored cart was unreadable ({error}), starting from an empty cart"
        );
    }

    Ok(cart)
}

/// Flush pending writes and print the resulting cart.
async fn finish(cart: &CartStore<FileStore>) {
    cart.flush().await;
    report(&cart.products());
}

fn report(cart: &CartSnapshot) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    info!("Cart");
    info!("====");
    for item in cart {
        info!(
            "  {} x{}  {}  @ {} = {}",
            item.id,
            item.quantity,
            item.title,
            item.price,
            item.line_total()
        );
    }
    info!("Items: {}", cart.total_quantity());
    info!("Subtotal: {}", cart.subtotal());
}

/// Show the current cart.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub async fn show() -> Result<(), CommandError> {
    let cart = open().await?;
    report(&cart.products());
    Ok(())
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the ID is empty, the price is negative or not a
/// number, or configuration cannot be loaded.
pub async fn add(id: &str, title: &str, image_url: &str, price: &str) -> Result<(), CommandError> {
    let product = ProductDescriptor::new(ProductId::parse(id)?, title, image_url, price.parse::<Price>()?);
    let cart = open().await?;
    cart.add_to_cart(&product);
    info!(id = %product.id, "Added to cart");
    finish(&cart).await;
    Ok(())
}

/// Add one unit to an existing line.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub async fn increment(id: &str) -> Result<(), CommandError> {
    let cart = open().await?;
    if !cart.increment(id) {
        warn!(id, "Product is not in the cart");
    }
    finish(&cart).await;
    Ok(())
}

/// Remove one unit from an existing line.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub async fn decrement(id: &str) -> Result<(), CommandError> {
    let cart = open().await?;
    if !cart.decrement(id) {
        warn!(id, "Product is not in the cart");
    }
    finish(&cart).await;
    Ok(())
}

/// Remove a line regardless of quantity.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub async fn remove(id: &str) -> Result<(), CommandError> {
    let cart = open().await?;
    if !cart.remove(id) {
        warn!(id, "Product is not in the cart");
    }
    finish(&cart).await;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub async fn clear() -> Result<(), CommandError> {
    let cart = open().await?;
    cart.clear();
    finish(&cart).await;
    Ok(())
}
