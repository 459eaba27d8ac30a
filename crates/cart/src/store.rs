//! The cart state container.
//!
//! [`CartStore`] owns the one live [`CartSnapshot`]. Every mutation is an
//! atomic read-modify-write on that snapshot, performed under the snapshot
//! channel's lock, so two mutations can never compute their result from the
//! same stale copy. Persistence happens off to the side: the new snapshot is
//! queued for the background writer and the caller continues immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use go_marketplace_core::{CartSnapshot, ProductDescriptor};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::persist::Persister;
use crate::storage::KeyValueStore;

/// What [`CartStore::load`] found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored cart was restored.
    Restored {
        /// Number of lines restored.
        items: usize,
    },
    /// Nothing was stored under the cart key.
    Empty,
    /// The stored cart could not be read; the cart starts empty.
    Recovered {
        /// Description of the read failure.
        error: String,
    },
}

/// Cart state container backed by a [`KeyValueStore`].
///
/// Construct one per session and share it (typically as `Arc<CartStore<S>>`)
/// with everything that reads or edits the cart.
pub struct CartStore<S: KeyValueStore> {
    storage: Arc<S>,
    key: String,
    state: watch::Sender<Arc<CartSnapshot>>,
    /// Version of the newest snapshot handed to the writer.
    version: AtomicU64,
    loaded: AtomicBool,
    persister: Persister,
}

impl<S: KeyValueStore> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.state.borrow().len())
            .field("version", &self.version.load(Ordering::Acquire))
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create an empty, not-yet-loaded cart and start its writer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the writer task is
    /// started with `tokio::spawn`.
    #[must_use]
    pub fn new(storage: S, config: &CartConfig) -> Self {
        let storage = Arc::new(storage);
        let persister = Persister::spawn(Arc::clone(&storage), config.cart_key.clone());
        let (state, _) = watch::channel(Arc::new(CartSnapshot::new()));

        Self {
            storage,
            key: config.cart_key.clone(),
            state,
            version: AtomicU64::new(0),
            loaded: AtomicBool::new(false),
            persister,
        }
    }

    /// Create a cart and load its persisted contents.
    ///
    /// Load failures are logged and leave the cart empty; see [`Self::load`].
    pub async fn open(storage: S, config: &CartConfig) -> Self {
        let store = Self::new(storage, config);
        store.load().await;
        store
    }

    /// Replace the in-memory cart with the persisted one.
    ///
    /// A missing entry leaves the cart as it is. Unreadable or malformed data
    /// is logged and likewise leaves the cart as it is; it is never surfaced
    /// as an error. Either way the store counts as loaded afterwards.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> LoadOutcome {
        let outcome = match self.read_persisted().await {
            Ok(Some(snapshot)) => {
                let items = snapshot.len();
                self.restore(snapshot);
                info!(items, "Restored persisted cart");
                LoadOutcome::Restored { items }
            }
            Ok(None) => {
                debug!("No persisted cart found");
                LoadOutcome::Empty
            }
            Err(e) => {
                warn!(error = %e, "Starting with an empty cart");
                LoadOutcome::Recovered {
                    error: e.to_string(),
                }
            }
        };

        self.loaded.store(true, Ordering::Release);
        outcome
    }

    async fn read_persisted(&self) -> Result<Option<CartSnapshot>> {
        let raw = self
            .storage
            .get(&self.key)
            .await
            .map_err(|e| CartError::PersistenceReadFailure(e.to_string()))?;

        match raw {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// Swap in a loaded snapshot wholesale.
    ///
    /// If mutations were applied before the load finished, their writes are
    /// already queued; the restored snapshot is queued after them so storage
    /// ends up matching memory again.
    fn restore(&self, snapshot: CartSnapshot) {
        self.state.send_modify(|current| {
            let snapshot = Arc::new(snapshot);
            if self.version.load(Ordering::Acquire) > 0 {
                let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
                self.persister.enqueue(version, Arc::clone(&snapshot));
            }
            *current = snapshot;
        });
    }

    /// Whether [`Self::load`] has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// The current cart.
    ///
    /// The returned snapshot never changes; after a mutation call this again
    /// for a fresh one.
    #[must_use]
    pub fn products(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.state.borrow())
    }

    /// Receive a new snapshot every time the cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.state.subscribe()
    }

    /// Storage key this cart persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply `change` to the current snapshot. If it reports a change, the
    /// result becomes the current snapshot, subscribers are notified, and it
    /// is queued for persistence.
    fn mutate(&self, op: &'static str, change: impl FnOnce(&mut CartSnapshot) -> bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            let mut next = CartSnapshot::clone(current);
            if !change(&mut next) {
                return false;
            }

            let next = Arc::new(next);
            let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
            self.persister.enqueue(version, Arc::clone(&next));
            *current = next;
            true
        });

        debug!(op, changed, "Cart mutation");
        changed
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product gains a unit and takes on
    /// `product`'s title, image and price. Otherwise a new line is appended.
    pub fn add_to_cart(&self, product: &ProductDescriptor) {
        self.mutate("add_to_cart", |cart| {
            cart.add(product);
            true
        });
    }

    /// Validate raw product fields, then add one unit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidProduct`] if `id` is empty or `price` is
    /// negative. The cart is left untouched in that case.
    pub fn add_to_cart_raw(
        &self,
        id: &str,
        title: &str,
        image_url: &str,
        price: Decimal,
    ) -> Result<()> {
        let product = ProductDescriptor::parse(id, title, image_url, price)?;
        self.add_to_cart(&product);
        Ok(())
    }

    /// Add one unit to the line for `id`. Unknown IDs are ignored.
    ///
    /// Returns whether the cart changed.
    pub fn increment(&self, id: &str) -> bool {
        self.mutate("increment", |cart| cart.increment(id))
    }

    /// Remove one unit from the line for `id`, dropping the line at zero.
    /// Unknown IDs are ignored.
    ///
    /// Returns whether the cart changed.
    pub fn decrement(&self, id: &str) -> bool {
        self.mutate("decrement", |cart| cart.decrement(id))
    }

    /// Drop the line for `id` entirely. Unknown IDs are ignored.
    ///
    /// Returns whether the cart changed.
    pub fn remove(&self, id: &str) -> bool {
        self.mutate("remove", |cart| cart.remove(id))
    }

    /// Empty the cart.
    ///
    /// Returns whether the cart changed.
    pub fn clear(&self) -> bool {
        self.mutate("clear", CartSnapshot::clear)
    }

    /// Wait until every change made so far has been handed to storage.
    ///
    /// Write failures are logged by the writer, not reported here.
    pub async fn flush(&self) {
        let version = self.version.load(Ordering::Acquire);
        self.persister.wait_for(version).await;
    }
}
