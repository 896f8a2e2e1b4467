//! Unit prices as they arrive from cart-builders.
//!
//! A price may be a JSON number (`300`, `500.99`) or a numeric string
//! (`"500.99"`). Both shapes are kept as-is so a cart written back to the
//! durable store is byte-for-byte what was read; [`Price::units`] is the only
//! place the two shapes are reconciled.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A unit price, numeric or textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// A JSON number.
    Numeric(Number),
    /// A numeric string such as `"500.99"`.
    Text(String),
}

impl Price {
    /// Floor-truncated whole currency units.
    ///
    /// Numbers are floored as `f64`. Plain decimal text (`"500.99"`) is
    /// floored exactly from its digits, however many there are; other text
    /// (scientific notation) is parsed as `f64` and floored. Unparseable text,
    /// and values outside the `i64` range, count as 0.
    #[must_use]
    pub fn units(&self) -> i64 {
        match self {
            Self::Numeric(number) => number
                .as_i64()
                .or_else(|| number.as_f64().and_then(floor_f64)),
            Self::Text(text) => {
                let text = text.trim();
                floor_plain_decimal(text)
                    .or_else(|| text.parse::<f64>().ok().and_then(floor_f64))
            }
        }
        .unwrap_or(0)
    }

    /// The price as a decimal, if it can be read as one.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Numeric(number) => number
                .as_i64()
                .map(Decimal::from)
                .or_else(|| number.as_f64().and_then(|v| Decimal::try_from(v).ok())),
            Self::Text(text) => parse_decimal(text.trim()),
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Floor of a plain `[+-]digits[.digits]` string without going through a
/// lossy parse. Returns `None` for any other shape or on `i64` overflow.
fn floor_plain_decimal(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let magnitude: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let has_fraction = fraction.bytes().any(|b| b != b'0');
    if negative {
        let floored = magnitude.checked_neg()?;
        if has_fraction { floored.checked_sub(1) } else { Some(floored) }
    } else {
        Some(magnitude)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn floor_f64(value: f64) -> Option<i64> {
    let floored = value.floor();
    // i64::MAX is not representable as f64; the bound below is 2^63.
    (floored.is_finite() && floored >= i64::MIN as f64 && floored < i64::MAX as f64)
        .then_some(floored as i64)
}

impl Default for Price {
    fn default() -> Self {
        Self::Numeric(Number::from(0))
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self::Numeric(Number::from(value))
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or_else(|| Self::Text(value.to_string()), Self::Numeric)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Price {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
