//! Core types for Threadline.
//!
//! This module provides type-safe wrappers for the cart and catalog domain.

pub mod amount;
pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;

pub use amount::{format_display_amount, format_display_decimal};
pub use cart::{Cart, CartLineItem, ItemOption};
pub use catalog::{CatalogQuery, ProductRecord};
pub use id::*;
pub use price::Price;
