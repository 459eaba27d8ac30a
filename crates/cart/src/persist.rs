//! Single-writer persistence task.
//!
//! Every cart mutation hands the complete new snapshot, stamped with a
//! version, to one background task. The task writes snapshots in version
//! order and, when several are queued, writes only the newest one. A
//! snapshot older than the last one written is never written, so storage
//! can't regress to a superseded cart.

use std::sync::Arc;

use go_marketplace_core::CartSnapshot;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use crate::error::{CartError, StorageError};
use crate::storage::KeyValueStore;

/// A snapshot waiting to be written.
#[derive(Debug)]
struct PendingWrite {
    version: u64,
    snapshot: Arc<CartSnapshot>,
}

/// Handle to the background writer.
///
/// Dropping the handle closes the queue; the task finishes whatever it has
/// already taken off the queue and exits.
#[derive(Debug)]
pub(crate) struct Persister {
    queue: mpsc::UnboundedSender<PendingWrite>,
    handled: watch::Receiver<u64>,
}

impl Persister {
    /// Spawn the writer on the current tokio runtime.
    pub(crate) fn spawn<S: KeyValueStore>(storage: Arc<S>, key: String) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (handled_tx, handled) = watch::channel(0);
        tokio::spawn(run(storage, key, rx, handled_tx));
        Self { queue, handled }
    }

    /// Queue `snapshot` as version `version`. Never blocks.
    pub(crate) fn enqueue(&self, version: u64, snapshot: Arc<CartSnapshot>) {
        if self
            .queue
            .send(PendingWrite { version, snapshot })
            .is_err()
        {
            warn!(version, "Cart writer has stopped, snapshot not persisted");
        }
    }

    /// Wait until every version up to and including `version` was handled.
    pub(crate) async fn wait_for(&self, version: u64) {
        let mut handled = self.handled.clone();
        if handled.wait_for(|done| *done >= version).await.is_err() {
            trace!(version, "Cart writer exited before reaching version");
        }
    }
}

async fn run<S: KeyValueStore>(
    storage: Arc<S>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<PendingWrite>,
    handled: watch::Sender<u64>,
) {
    let mut last_written = 0;

    while let Some(mut next) = rx.recv().await {
        while let Ok(queued) = rx.try_recv() {
            if queued.version > next.version {
                trace!(skipped = next.version, newer = queued.version, "Coalescing cart write");
                next = queued;
            }
        }

        if next.version <= last_written {
            trace!(version = next.version, last_written, "Dropping stale cart write");
            continue;
        }

        match write(storage.as_ref(), &key, &next.snapshot).await {
            Ok(()) => debug!(version = next.version, items = next.snapshot.len(), "Cart persisted"),
            Err(e) => warn!(version = next.version, error = %e, "Cart write failed, next change will retry"),
        }

        last_written = next.version;
        handled.send_replace(next.version);
    }

    debug!("Cart writer stopped");
}

async fn write<S: KeyValueStore>(
    storage: &S,
    key: &str,
    snapshot: &CartSnapshot,
) -> Result<(), CartError> {
    let json = serde_json::to_string(snapshot).map_err(StorageError::from)?;
    storage.set(key, json).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use go_marketplace_core::{Price, ProductDescriptor, ProductId};

    use super::*;
    use crate::storage::MemoryStore;

    fn cart_with(ids: &[&str]) -> Arc<CartSnapshot> {
        let mut cart = CartSnapshot::new();
        for id in ids {
            cart.add(&ProductDescriptor::new(
                ProductId::parse(id).unwrap(),
                *id,
                "",
                Price::from_cents(100).unwrap(),
            ));
        }
        Arc::new(cart)
    }

    async fn stored(store: &MemoryStore) -> CartSnapshot {
        serde_json::from_str(&store.get("cart").await.unwrap().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_writes_latest_snapshot() {
        let store = MemoryStore::new();
        let persister = Persister::spawn(Arc::new(store.clone()), "cart".to_string());

        persister.enqueue(1, cart_with(&["A"]));
        persister.enqueue(2, cart_with(&["A", "B"]));
        persister.enqueue(3, cart_with(&["A", "B", "C"]));
        persister.wait_for(3).await;

        assert_eq!(stored(&store).await, *cart_with(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_stale_version_never_overwrites() {
        let store = MemoryStore::new();
        let persister = Persister::spawn(Arc::new(store.clone()), "cart".to_string());

        persister.enqueue(5, cart_with(&["A", "B"]));
        persister.wait_for(5).await;
        persister.enqueue(4, cart_with(&["A"]));
        persister.enqueue(6, cart_with(&["A", "B", "C"]));
        persister.wait_for(6).await;

        assert_eq!(stored(&store).await, *cart_with(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_wait_for_zero_returns_immediately() {
        let persister = Persister::spawn(Arc::new(MemoryStore::new()), "cart".to_string());
        persister.wait_for(0).await;
    }
}
