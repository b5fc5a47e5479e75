//! Numeric helpers centralizing rounding and safe numeric casts.

use num_traits::cast::cast;

/// Round to two decimal places using the exact binary value of `value`.
///
/// Only true ties round half to even, so `0.125` becomes `0.12` while
/// `2.675` (stored just below the tie) becomes `2.67`. Non-finite input is
/// returned unchanged.
#[must_use]
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scaled = value * 100.0;
    // Exact residual of the multiplication above.
    let error = value.mul_add(100.0, -scaled);
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 && error != 0.0 {
        if error > 0.0 {
            scaled.ceil()
        } else {
            scaled.floor()
        }
    } else {
        scaled.round_ties_even()
    };
    rounded / 100.0
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// True when `value` is a usable distance: finite and not negative.
#[must_use]
pub fn is_valid_km(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
