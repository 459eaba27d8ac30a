//! Persistence behaviour across sessions and storage failures.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use go_marketplace_cart::{CartStore, FileStore, KeyValueStore, LoadOutcome, MemoryStore};
use go_marketplace_core::CartSnapshot;
use go_marketplace_integration_tests::{FlakyStore, SlowRecordingStore, TempCartDir, product};

// =============================================================================
// Reopening
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = TempCartDir::new();

    let expected = {
        let cart = CartStore::open(FileStore::new(dir.path()), &dir.config()).await;
        cart.add_to_cart(&product("B", "Hat", 1500));
        cart.add_to_cart(&product("A", "Shoe", 1000));
        cart.add_to_cart(&product("A", "Shoe", 1000));
        cart.flush().await;
        cart.products()
    };

    let reopened = CartStore::new(FileStore::new(dir.path()), &dir.config());
    assert_eq!(reopened.load().await, LoadOutcome::Restored { items: 2 });
    assert_eq!(*reopened.products(), *expected);

    let ids: Vec<_> = reopened.products().iter().map(|i| i.id.to_string()).collect();
    assert_eq!(ids, vec!["B", "A"]);
}

#[tokio::test]
async fn test_corrupt_file_starts_empty_then_heals() {
    let dir = TempCartDir::new();
    let config = dir.config();
    FileStore::new(dir.path())
        .set(&config.cart_key, "[{\"id\": ".to_string())
        .await
        .unwrap();

    let cart = CartStore::new(FileStore::new(dir.path()), &config);
    assert!(matches!(cart.load().await, LoadOutcome::Recovered { .. }));
    assert!(cart.products().is_empty());

    cart.add_to_cart(&product("A", "Shoe", 1000));
    cart.flush().await;

    let reopened = CartStore::open(FileStore::new(dir.path()), &config).await;
    assert_eq!(*reopened.products(), *cart.products());
}

#[tokio::test]
async fn test_separate_keys_are_separate_carts() {
    let dir = TempCartDir::new();
    let first = CartStore::open(
        FileStore::new(dir.path()),
        &dir.config().with_cart_key("@GoMarketplace:alice"),
    )
    .await;
    let second = CartStore::open(
        FileStore::new(dir.path()),
        &dir.config().with_cart_key("@GoMarketplace:bob"),
    )
    .await;

    first.add_to_cart(&product("A", "Shoe", 1000));
    second.add_to_cart(&product("B", "Hat", 1500));
    first.flush().await;
    second.flush().await;

    let alice = CartStore::open(
        FileStore::new(dir.path()),
        &dir.config().with_cart_key("@GoMarketplace:alice"),
    )
    .await;
    assert!(alice.products().get("A").is_some());
    assert!(alice.products().get("B").is_none());
}

// =============================================================================
// Write Failures
// =============================================================================

#[tokio::test]
async fn test_failed_write_heals_on_next_change() {
    let memory = MemoryStore::new();
    let storage = FlakyStore::new(memory.clone(), 1);
    let cart = CartStore::open(storage.clone(), &TempCartDir::new().config()).await;

    cart.add_to_cart(&product("A", "Shoe", 1000));
    cart.flush().await;
    assert_eq!(storage.remaining_failures(), 0);
    assert_eq!(memory.get(cart.key()).await.unwrap(), None);

    cart.increment("A");
    cart.flush().await;

    let stored: CartSnapshot =
        serde_json::from_str(&memory.get(cart.key()).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored, *cart.products());
    assert_eq!(stored.get("A").unwrap().quantity.get(), 2);
}

// =============================================================================
// Write Ordering
// =============================================================================

#[tokio::test]
async fn test_rapid_changes_persist_final_state() {
    let storage = SlowRecordingStore::new();
    let cart = CartStore::open(storage.clone(), &TempCartDir::new().config()).await;

    // Nothing is awaited between changes.
    cart.add_to_cart(&product("A", "Shoe", 1000));
    cart.add_to_cart(&product("B", "Hat", 1500));
    cart.increment("A");
    cart.increment("B");
    cart.decrement("A");
    cart.add_to_cart(&product("C", "Sock", 300));
    cart.flush().await;

    let stored: CartSnapshot =
        serde_json::from_str(&storage.get(cart.key()).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored, *cart.products());
}

#[tokio::test]
async fn test_persisted_writes_never_go_backwards() {
    let storage = SlowRecordingStore::new();
    let cart = CartStore::open(storage.clone(), &TempCartDir::new().config()).await;

    for round in 0..10 {
        cart.add_to_cart(&product("A", "Shoe", 1000));
        if round % 3 == 0 {
            tokio::task::yield_now().await;
        }
    }
    cart.flush().await;

    let totals: Vec<u64> = storage
        .writes()
        .await
        .iter()
        .map(|raw| serde_json::from_str::<CartSnapshot>(raw).unwrap().total_quantity())
        .collect();

    assert!(!totals.is_empty());
    assert!(totals.windows(2).all(|pair| pair[0] < pair[1]), "{totals:?}");
    assert_eq!(totals.last().copied(), Some(10));
}
