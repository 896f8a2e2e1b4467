//! Cart state for the sidebar and badge views.
//!
//! - [`manager`] - seeding, edits, persistence and notification
//! - [`events`] - the `storage` / `cartUpdated` notification channels

pub mod events;
pub mod manager;

pub use events::{CartBus, CartUpdated, Channel};
pub use manager::{CART_STORAGE_KEY, CartError, CartStateManager, read_cart};
