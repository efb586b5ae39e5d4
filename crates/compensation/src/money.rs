//! Currency primitives shared by every formula module.
//!
//! Amounts are carried as binary floating point end to end so results match
//! the figures users already see in previews. Conversion to integer minor
//! units happens once, at the ledger boundary.

/// Monetary amount in major units (dollars).
pub type Money = f64;

/// Absolute tolerance used when checking money invariants.
pub const MONEY_EPSILON: f64 = 1e-9;

const CENTS_PER_UNIT: f64 = 100.0;

/// Round to whole cents, half away from zero.
pub fn round_cents(amount: Money) -> Money {
    (amount * CENTS_PER_UNIT).round() / CENTS_PER_UNIT
}

/// Convert to integer cents for persistence.
///
/// Non-finite input maps to zero; out-of-range values saturate.
pub fn to_cents(amount: Money) -> i64 {
    if !amount.is_finite() {
        return 0;
    }
    // `as` saturates for floats outside the i64 range.
    (amount * CENTS_PER_UNIT).round() as i64
}

/// Compare two amounts with a tolerance that grows with their magnitude.
pub fn approx_eq(a: Money, b: Money) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= MONEY_EPSILON * scale
}
