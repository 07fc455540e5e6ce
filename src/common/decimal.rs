//! Exact decimal helpers for quantities and percentages

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::errors::{ClientError, Result};

/// Parse a decimal string, rejecting anything that is not a plain number
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| ClientError::InvalidQuantity(format!("{s}: {e}")))
}

/// Parse a percentage into a fraction
///
/// `"81%"` becomes `0.81`; a value without the suffix is taken as a fraction
/// already, so `"0.12"` stays `0.12`.
pub fn parse_percentage(s: &str) -> Result<Decimal> {
    let trimmed = s.trim();
    match trimmed.strip_suffix('%') {
        Some(prefix) => {
            let pct = parse_decimal(prefix)?;
            pct.checked_div(Decimal::ONE_HUNDRED)
                .ok_or_else(|| ClientError::InvalidQuantity(s.to_string()))
        }
        None => parse_decimal(trimmed),
    }
}

/// Whether the quantity string asks for a share of the balance
pub fn is_percentage(s: &str) -> bool {
    s.trim().ends_with('%')
}

/// Drop every digit past `precision` decimal places, without rounding
pub fn truncate(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

/// Round to `precision` decimal places, halves away from zero
pub fn round_half_up(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}
