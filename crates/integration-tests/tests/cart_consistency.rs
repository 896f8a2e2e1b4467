//! Several cart views sharing one durable store.
//!
//! The sidebar and the header badge each hold their own cart manager. After
//! either mutates, the other re-reads the store on the `cartUpdated` signal
//! and ends up with the same cart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use threadline_core::{Cart, CartLineItem, ItemId};
use threadline_storefront::cart::{CART_STORAGE_KEY, CartBus, CartStateManager, read_cart};
use threadline_storefront::store::{DurableStore, FileStore, MemoryStore, Namespaced};

fn scenario_cart() -> Cart {
    Cart::new(vec![
        CartLineItem::new("1", "Linen Shirt", "500.99", 2),
        CartLineItem::new("2", "Canvas Tote", 300_i64, 1),
    ])
}

#[test]
fn test_badge_follows_sidebar_edits() {
    let store = Arc::new(MemoryStore::new());
    let bus = CartBus::new();

    let mut sidebar = CartStateManager::new(scenario_cart(), Arc::clone(&store), bus.clone());
    let mut badge = CartStateManager::load(Arc::clone(&store), bus.clone()).unwrap();
    let mut badge_signals = bus.subscribe();

    assert_eq!(sidebar.subtotal(), 1300);
    assert_eq!(badge.item_count(), 0);

    sidebar.update_quantity(&ItemId::from("1"), 1).unwrap();
    assert!(badge.catch_up(&mut badge_signals).unwrap());
    assert_eq!(badge.item_count(), 4);

    sidebar.remove_item(&ItemId::from("2")).unwrap();
    assert!(badge.catch_up(&mut badge_signals).unwrap());
    assert_eq!(badge.cart(), sidebar.cart());
    assert_eq!(badge.display_subtotal(), "1,500");
}

#[test]
fn test_edits_from_either_view_converge() {
    let store = Arc::new(MemoryStore::new());
    let bus = CartBus::new();

    let mut a = CartStateManager::new(scenario_cart(), Arc::clone(&store), bus.clone());
    let mut a_signals = bus.subscribe();
    let mut b = CartStateManager::new(Cart::default(), Arc::clone(&store), bus.clone());
    let mut b_signals = bus.subscribe();

    a.update_quantity(&ItemId::from("2"), 2).unwrap();
    assert!(b.catch_up(&mut b_signals).unwrap());
    // A also hears its own signal; re-reading is harmless.
    assert!(a.catch_up(&mut a_signals).unwrap());

    b.add_item(CartLineItem::new("3", "Wool Socks", "90", 1)).unwrap();
    assert!(a.catch_up(&mut a_signals).unwrap());

    assert_eq!(a.cart(), b.cart());
    assert_eq!(a.items().len(), 3);
    assert_eq!(read_cart(store.as_ref()).unwrap(), *a.cart());
}

#[test]
fn test_initialize_is_authoritative_until_sync() {
    let store = Arc::new(MemoryStore::new());
    let bus = CartBus::new();

    let mut writer = CartStateManager::new(scenario_cart(), Arc::clone(&store), bus.clone());
    writer.remove_item(&ItemId::from("1")).unwrap();

    // A stale snapshot from the cart provider wins locally...
    let mut view = CartStateManager::new(Cart::default(), Arc::clone(&store), bus);
    view.initialize(scenario_cart());
    assert_eq!(view.items().len(), 2);

    // ...until the view re-reads the store.
    view.sync_from_store().unwrap();
    assert_eq!(view.items().len(), 1);
    assert_eq!(view.items()[0].id, ItemId::from("2"));
}

#[test]
fn test_file_store_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileStore::open(dir.path()).unwrap();
        let mut mgr = CartStateManager::new(scenario_cart(), store, CartBus::new());
        mgr.update_quantity(&ItemId::from("1"), -5).unwrap();
    }

    let reopened = FileStore::open(dir.path()).unwrap();
    let mgr = CartStateManager::load(reopened, CartBus::new()).unwrap();
    assert_eq!(mgr.items().len(), 2);
    assert_eq!(mgr.items()[0].quantity, 1);
    assert_eq!(mgr.subtotal(), 800);
}

#[test]
fn test_namespaced_carts_are_isolated() {
    let backend: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let bus = CartBus::new();
    let mut events = backend.subscribe();

    let mut alice = CartStateManager::new(
        scenario_cart(),
        Namespaced::new(Arc::clone(&backend), "alice"),
        bus.clone(),
    );
    let bob = CartStateManager::load(Namespaced::new(Arc::clone(&backend), "bob"), bus).unwrap();

    alice.remove_item(&ItemId::from("2")).unwrap();

    assert_eq!(events.try_recv().unwrap().key, format!("alice:{CART_STORAGE_KEY}"));
    assert!(bob.cart().is_empty());
    assert!(backend.get(&format!("bob:{CART_STORAGE_KEY}")).unwrap().is_none());
    assert_eq!(
        read_cart(&Namespaced::new(backend, "alice")).unwrap().len(),
        1
    );
}

#[test]
fn test_unknown_fields_round_trip_through_store() {
    let store = Arc::new(MemoryStore::new());
    let raw = r#"[{"id":7,"name":"Scarf","price":"45.50","quantity":1,"image":"scarf.jpg","sku":"SC-7","color":{"name":"Rust","hex":"b7410e"}}]"#;
    store.set(CART_STORAGE_KEY, raw).unwrap();

    let mut mgr = CartStateManager::load(Arc::clone(&store), CartBus::new()).unwrap();
    mgr.add_item(CartLineItem::new("8", "Beanie", 30_i64, 1)).unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&store.get(CART_STORAGE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored[0]["id"], 7);
    assert!(stored[1].get("image").is_none());
    assert_eq!(stored[0]["price"], "45.50");
    assert_eq!(stored[0]["sku"], "SC-7");
    assert_eq!(stored[0]["color"]["hex"], "b7410e");
    assert!(stored[1].get("color").is_none());
    assert_eq!(mgr.subtotal(), 75);
}
