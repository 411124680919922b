use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Planar navigation helpers (x east, y north, headings clockwise from north)
// ---------------------------------------------------------------------------

/// Wrap any angle into [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Signed shortest rotation from `from` to `to`, in [-180, 180].
/// Positive means turn right.
pub fn heading_difference(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Planar bearing from one point to another, degrees in [0, 360).
pub fn bearing(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    let d = to - from;
    if d.norm() < 1e-9 {
        return 0.0;
    }
    normalize_heading(d.x.atan2(d.y).to_degrees())
}

/// Unit vector pointing along a heading.
pub fn heading_vector(heading_deg: f64) -> Vector2<f64> {
    let r = heading_deg.to_radians();
    Vector2::new(r.sin(), r.cos())
}
