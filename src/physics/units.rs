// ---------------------------------------------------------------------------
// Unit conversions and physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665; // standard gravity, m/s^2

pub const FT_TO_M: f64 = 0.3048;
pub const KT_TO_MS: f64 = 0.514_444;
pub const MS_TO_FPM: f64 = 196.850_394;
pub const NM_TO_FT: f64 = 6_076.12;

/// Map a non-finite result onto zero so it can never leak into aircraft state.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
