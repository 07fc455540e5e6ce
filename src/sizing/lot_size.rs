use rust_decimal::Decimal;

use crate::common::decimal::truncate;
use crate::common::errors::{ClientError, Result};
use crate::common::types::LotSize;

fn overflow(amount: Decimal) -> ClientError {
    ClientError::InvalidQuantity(format!("{amount} does not fit the lot grid"))
}

/// Snap an amount onto the exchange's lot grid
///
/// Amounts below `min_qty` become zero. Otherwise the part above `min_qty` is
/// cut down to a whole number of steps, `min_qty` is added back and the
/// result is truncated to `precision` decimal places. Nothing is rounded up,
/// so the quantity never exceeds `amount`. Amounts too large for the grid
/// arithmetic are an `InvalidQuantity` error.
pub fn normalize(
    amount: Decimal,
    min_qty: Decimal,
    step_size: Decimal,
    precision: u32,
) -> Result<Decimal> {
    let base = amount.checked_sub(min_qty).ok_or_else(|| overflow(amount))?;
    if base < Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let snapped = if step_size > Decimal::ZERO {
        base.checked_div(step_size)
            .and_then(|steps| steps.trunc().checked_mul(step_size))
            .ok_or_else(|| overflow(amount))?
    } else {
        base
    };

    let quantity = snapped.checked_add(min_qty).ok_or_else(|| overflow(amount))?;
    Ok(truncate(quantity, precision).normalize())
}

/// [`normalize`] with the constraints of a symbol's LOT_SIZE filter
pub fn normalize_with_filter(amount: Decimal, lot_size: &LotSize, precision: u32) -> Result<Decimal> {
    normalize(amount, lot_size.min_qty, lot_size.step_size, precision)
}
