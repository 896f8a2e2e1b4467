//! Session-scoped models for storefront.

pub mod session;

pub use session::{CartOwner, keys as session_keys};
