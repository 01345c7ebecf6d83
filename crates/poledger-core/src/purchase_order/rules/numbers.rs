//! Numeric normalization for US-formatted purchase-order values.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

/// Parse a US-formatted amount (e.g., "4,500.00" or "12.5").
///
/// Thousands separators are dropped; the value is not scaled.
pub fn parse_us_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse an integer, dropping thousands separators.
pub fn parse_us_integer(s: &str) -> Option<i64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Parse an amount and truncate it to a whole number ("1,200.00" -> 1200).
pub fn parse_whole_quantity(s: &str) -> Option<i64> {
    parse_us_amount(s)?.trunc().to_i64()
}
