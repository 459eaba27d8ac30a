//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end cart flows through `CartStore`
//! - `cart_persistence` - Reopening carts from disk, storage failures, write ordering
//!
//! This library holds the shared fixtures: temporary storage directories,
//! product builders, and storage backends that fail or stall on purpose.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use go_marketplace_cart::{CartConfig, KeyValueStore, MemoryStore, StorageError};
use go_marketplace_core::{Price, ProductDescriptor, ProductId};
use tokio::sync::Mutex;

/// A unique storage directory, removed on drop.
#[derive(Debug)]
pub struct TempCartDir {
    path: PathBuf,
}

impl TempCartDir {
    #[must_use]
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("gm-cart-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cart configuration pointing at this directory.
    #[must_use]
    pub fn config(&self) -> CartConfig {
        CartConfig::default().with_storage_dir(&self.path)
    }
}

impl Default for TempCartDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempCartDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Build a valid product.
///
/// # Panics
///
/// Panics if `id` is empty or `cents` is negative.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: &str, title: &str, cents: i64) -> ProductDescriptor {
    ProductDescriptor::new(
        ProductId::parse(id).unwrap(),
        title,
        format!("https://img.example/{id}.png"),
        Price::from_cents(cents).unwrap(),
    )
}

/// Memory store whose first `failures` writes fail.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    inner: MemoryStore,
    failures: Arc<AtomicUsize>,
}

impl FlakyStore {
    #[must_use]
    pub fn new(inner: MemoryStore, failures: usize) -> Self {
        Self {
            inner,
            failures: Arc::new(AtomicUsize::new(failures)),
        }
    }

    /// Writes still set to fail.
    #[must_use]
    pub fn remaining_failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StorageError::Unavailable("simulated write failure".to_string()));
        }
        self.inner.set(key, value).await
    }
}

/// Memory store that records every write and stalls before completing it.
///
/// The first write is the slowest, so a store that let writes overlap would
/// finish them out of order.
#[derive(Debug, Clone, Default)]
pub struct SlowRecordingStore {
    inner: MemoryStore,
    writes: Arc<Mutex<Vec<String>>>,
}

impl SlowRecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every value written, in completion order.
    pub async fn writes(&self) -> Vec<String> {
        self.writes.lock().await.clone()
    }
}

impl KeyValueStore for SlowRecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let earlier = self.writes.lock().await.len();
        let earlier = u64::try_from(earlier).unwrap_or(u64::MAX);
        let delay = 30_u64.saturating_sub(earlier.saturating_mul(10));
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.writes.lock().await.push(value.clone());
        self.inner.set(key, value).await
    }
}
