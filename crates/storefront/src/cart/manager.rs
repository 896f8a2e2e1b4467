//! Cart state reconciliation.
//!
//! [`CartStateManager`] holds one view's copy of the cart. Every edit builds a
//! new [`Cart`], writes it whole to the durable store under [`CART_STORAGE_KEY`],
//! and only then adopts it and announces it. A failed write leaves the
//! previous cart in place and announces nothing.

use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, instrument};

use threadline_core::{Cart, CartLineItem, ItemId, format_display_amount};

use crate::cart::events::{CartBus, CartUpdated};
use crate::store::{DurableStore, StoreError};

/// Durable store key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors from cart persistence.
#[derive(Debug, Error)]
pub enum CartError {
    /// The durable store rejected a read or write.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The stored cart is not a valid line item array.
    #[error("Stored cart is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Read the cart currently held by `store`. A missing key is an empty cart.
///
/// # Errors
///
/// Returns `CartError::Store` if the read fails and `CartError::Decode` if
/// the stored value is not a cart.
pub fn read_cart<S: DurableStore + ?Sized>(store: &S) -> Result<Cart, CartError> {
    match store.get(CART_STORAGE_KEY)? {
        Some(raw) => serde_json::from_str(&raw).map_err(CartError::Decode),
        None => Ok(Cart::default()),
    }
}

/// One view's cart, mirrored to a durable store.
#[derive(Debug)]
pub struct CartStateManager<S> {
    cart: Cart,
    store: S,
    bus: CartBus,
}

impl<S: DurableStore> CartStateManager<S> {
    /// Create a manager seeded with `snapshot`.
    ///
    /// The snapshot is authoritative: the durable store is not consulted.
    #[must_use]
    pub const fn new(snapshot: Cart, store: S, bus: CartBus) -> Self {
        Self {
            cart: snapshot,
            store,
            bus,
        }
    }

    /// Create a manager seeded from whatever the durable store holds.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the stored cart cannot be read or decoded.
    pub fn load(store: S, bus: CartBus) -> Result<Self, CartError> {
        let cart = read_cart(&store)?;
        Ok(Self::new(cart, store, bus))
    }

    /// Replace local state with `snapshot`, discarding local edits.
    ///
    /// Nothing is written or announced.
    pub fn initialize(&mut self, snapshot: Cart) {
        debug!(items = snapshot.len(), "cart seeded from snapshot");
        self.cart = snapshot;
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.cart.subtotal()
    }

    /// Subtotal formatted for display, without currency symbol.
    #[must_use]
    pub fn display_subtotal(&self) -> String {
        format_display_amount(self.subtotal())
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Drop the item with `id`, persist, and notify.
    ///
    /// Unknown ids leave the items unchanged; the cart is still written and
    /// announced.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart cannot be persisted.
    #[instrument(skip(self, id), fields(id = %id))]
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        let next = self.cart.without(id);
        self.commit(next)
    }

    /// Apply `delta` to the quantity of the item with `id`, persist, and notify.
    ///
    /// A result of zero or less clamps to 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart cannot be persisted.
    #[instrument(skip(self, id), fields(id = %id))]
    pub fn update_quantity(&mut self, id: &ItemId, delta: i64) -> Result<(), CartError> {
        let next = self.cart.with_quantity_delta(id, delta);
        self.commit(next)
    }

    /// Add `item`, merging with an existing line of the same id.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart cannot be persisted.
    #[instrument(skip(self, item), fields(id = %item.id, quantity = item.quantity))]
    pub fn add_item(&mut self, item: CartLineItem) -> Result<(), CartError> {
        let next = self.cart.with_item(item);
        self.commit(next)
    }

    /// Seed with `snapshot` and persist it as the durable cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart cannot be persisted.
    pub fn replace(&mut self, snapshot: Cart) -> Result<(), CartError> {
        self.commit(snapshot)
    }

    /// Re-derive local state from the durable store.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the stored cart cannot be read or decoded; local
    /// state is left unchanged then.
    pub fn sync_from_store(&mut self) -> Result<(), CartError> {
        self.cart = read_cart(&self.store)?;
        Ok(())
    }

    /// Drain pending `cartUpdated` signals and re-sync if any arrived.
    ///
    /// Returns whether a re-sync happened. A lagged receiver counts as having
    /// seen a change.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the re-sync fails.
    pub fn catch_up(
        &mut self,
        signals: &mut broadcast::Receiver<CartUpdated>,
    ) -> Result<bool, CartError> {
        let mut changed = false;
        loop {
            match signals.try_recv() {
                Ok(CartUpdated) | Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if changed {
            self.sync_from_store()?;
        }
        Ok(changed)
    }

    /// Single write path for every mutation.
    fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        let serialized = serde_json::to_string(&next).map_err(CartError::Encode)?;
        self.store.set(CART_STORAGE_KEY, &serialized)?;

        debug!(
            items = next.len(),
            subtotal = next.subtotal(),
            bytes = serialized.len(),
            "cart committed"
        );
        self.cart = next;
        self.bus.publish();
        Ok(())
    }
}
