//! Display formatting for whole-unit amounts.
//!
//! Amounts are shown without fractional subunits and grouped the US way
//! (`1,234,567`). The currency symbol is static presentation and never part
//! of the formatted value.

use rust_decimal::Decimal;

/// Format a whole-unit amount with thousands separators.
///
/// ```rust
/// # use threadline_core::format_display_amount;
/// assert_eq!(format_display_amount(1_234_567), "1,234,567");
/// assert_eq!(format_display_amount(999), "999");
/// ```
#[must_use]
pub fn format_display_amount(amount: i64) -> String {
    let grouped = group_thousands(&amount.unsigned_abs().to_string());
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Floor a decimal amount to whole units, then format it.
#[must_use]
pub fn format_display_decimal(amount: Decimal) -> String {
    let floored = amount.floor();
    let grouped = group_thousands(&floored.abs().trunc().normalize().to_string());
    if floored.is_sign_negative() && !floored.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display_amount() {
        assert_eq!(format_display_amount(0), "0");
        assert_eq!(format_display_amount(999), "999");
        assert_eq!(format_display_amount(1000), "1,000");
        assert_eq!(format_display_amount(1_234_567), "1,234,567");
        assert_eq!(format_display_amount(-45_000), "-45,000");
    }

    #[test]
    fn test_format_display_amount_extremes() {
        assert_eq!(format_display_amount(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_format_display_decimal_floors() {
        assert_eq!(format_display_decimal(Decimal::new(123_456_799, 2)), "1,234,567");
        assert_eq!(format_display_decimal(Decimal::new(99_999, 2)), "999");
        assert_eq!(format_display_decimal(Decimal::new(-15, 1)), "-2");
        assert_eq!(format_display_decimal(Decimal::new(3, 1)), "0");
    }
}
