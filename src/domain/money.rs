//! Cent-precision price arithmetic.
//!
//! Prices travel as `f64` across the ports boundary and in the
//! persisted document, but every rounding step goes through
//! `Decimal` so that `0.285` rounds to `0.29` instead of whatever
//! the nearest binary fraction happens to produce.

use rust_decimal::prelude::*;

/// Round a price to two decimal places (midpoint away from zero).
///
/// Non-finite inputs come back unchanged.
pub fn round_cents(price: f64) -> f64 {
    Decimal::from_f64(price)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(price)
}

/// Round a price up to the next whole cent.
pub fn ceil_cents(price: f64) -> f64 {
    Decimal::from_f64(price)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(price)
}

/// Round to cents, then lift anything that rounded below `floor`
/// back up to the floor (itself rounded up to a whole cent).
pub fn settle(price: f64, floor: f64) -> f64 {
    let rounded = round_cents(price.max(floor));
    if rounded < floor {
        ceil_cents(floor)
    } else {
        rounded
    }
}

/// A scraped value is usable only if it is a finite, strictly positive number.
pub fn is_positive_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
