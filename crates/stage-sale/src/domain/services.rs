//! # Domain Services
//!
//! Pure arithmetic for purchase settlement. No I/O, no async.

use crate::domain::value_objects::U256;
use crate::errors::SaleError;

/// Payment cost of `amount` sale-token base units at `price` units per
/// `price_scale` payment units: `amount * price_scale / price`.
///
/// The fractional remainder is truncated toward zero, matching the
/// payment token's smallest unit.
pub fn compute_cost(amount: U256, price: u64, price_scale: U256) -> Result<U256, SaleError> {
    if price == 0 {
        return Err(SaleError::ArithmeticOverflow);
    }
    amount
        .checked_mul(price_scale)
        .ok_or(SaleError::ArithmeticOverflow)
        .map(|scaled| scaled / U256::from(price))
}

/// Adds two amounts, failing on overflow.
pub fn checked_add(a: U256, b: U256) -> Result<U256, SaleError> {
    a.checked_add(b).ok_or(SaleError::ArithmeticOverflow)
}
