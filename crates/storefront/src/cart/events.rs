//! Cart change notification channels.
//!
//! Two payload-free channels tell other views that the cart changed:
//!
//! - `storage` - the generic "durable storage changed" signal, published by
//!   the [`DurableStore`](crate::store::DurableStore) itself on every write
//! - `cartUpdated` - the cart-specific signal, published on the [`CartBus`]
//!
//! Receivers are expected to re-read the durable store; neither channel says
//! what changed.

use tokio::sync::broadcast;

/// Capacity of the cart bus. Slow receivers that fall further behind see
/// `Lagged`, which still means "the cart changed".
const BUS_CAPACITY: usize = 256;

/// Notification channel names as seen by browser-side listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Storage,
    CartUpdated,
}

impl Channel {
    /// Every channel, in emission order.
    pub const ALL: [Self; 2] = [Self::Storage, Self::CartUpdated];

    /// Event name used by listeners.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::CartUpdated => "cartUpdated",
        }
    }

    /// `HX-Trigger` header value firing every channel.
    #[must_use]
    pub const fn trigger_all() -> &'static str {
        "storage, cartUpdated"
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The `cartUpdated` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartUpdated;

/// Process-wide broadcast of [`CartUpdated`].
///
/// Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct CartBus {
    tx: broadcast::Sender<CartUpdated>,
}

impl CartBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartUpdated> {
        self.tx.subscribe()
    }

    /// Announce a cart change. Returns how many receivers were notified.
    pub fn publish(&self) -> usize {
        self.tx.send(CartUpdated).unwrap_or(0)
    }
}

impl Default for CartBus {
    fn default() -> Self {
        Self::new()
    }
}
