// ---------------------------------------------------------------------------
// Drag polar helpers
// ---------------------------------------------------------------------------

/// Dynamic pressure q = ½·ρ·v², Pa.
pub fn dynamic_pressure(density: f64, tas_ms: f64) -> f64 {
    0.5 * density * tas_ms * tas_ms
}

/// Lift coefficient needed to support `weight_n` at dynamic pressure `q`.
pub fn lift_coefficient(weight_n: f64, q: f64, wing_area: f64) -> f64 {
    let qs = q * wing_area;
    if qs > 1e-6 {
        weight_n / qs
    } else {
        0.0
    }
}

/// Parabolic drag polar CD = CD0 + k·CL².
pub fn drag_coefficient(cd0: f64, k: f64, cl: f64) -> f64 {
    cd0 + k * cl * cl
}
