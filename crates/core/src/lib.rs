//! Threadline Core - Shared types library.
//!
//! This crate provides the types shared by all Threadline components:
//! - `storefront` - Cart sidebar, policy pages and catalog routes
//! - `cli` - Catalog migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Cart arithmetic lives here so every surface
//! (sidebar, badge, CLI) computes totals the same way.
//!
//! # Modules
//!
//! - [`types`] - Item ids, prices, cart line items, catalog records and
//!   display-amount formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
