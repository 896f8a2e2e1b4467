//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use threadline_core::{Price, format_display_amount};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Floors an amount to whole currency units and groups thousands.
///
/// The value is read the way a cart price is, so `"1234.99"` renders as
/// `1,234`. Non-numeric input renders as `0`.
///
/// Usage in templates: `{{ cart.subtotal|display_amount }}`
#[askama::filter_fn]
pub fn display_amount(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_display_amount(Price::from(value.to_string()).units()))
}
