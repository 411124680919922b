use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::consts::GLIDESLOPE_FT_PER_NM;
use super::geometry::{bearing, heading_difference, heading_vector, normalize_heading};
use super::leg::AltitudeConstraint;

// ---------------------------------------------------------------------------
// Waypoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub position: Vector2<f64>, // NM, local frame
    #[serde(default)]
    pub altitude: Option<AltitudeConstraint>,
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, position: Vector2<f64>) -> Self {
        Self { name: name.into(), position, altitude: None, speed_limit: None }
    }

    pub fn with_altitude(mut self, constraint: AltitudeConstraint) -> Self {
        self.altitude = Some(constraint);
        self
    }

    pub fn with_speed_limit(mut self, limit: f64) -> Self {
        self.speed_limit = Some(limit);
        self
    }

    pub fn distance_nm(&self, from: &Vector2<f64>) -> f64 {
        (self.position - from).norm()
    }
}

// ---------------------------------------------------------------------------
// Runway with ILS geometry
// ---------------------------------------------------------------------------

/// Gain applied to localizer angular deviation to get an intercept correction.
const LOC_INTERCEPT_GAIN: f64 = 3.0;

/// Largest intercept correction the localizer law commands, deg.
const LOC_MAX_CORRECTION_DEG: f64 = 30.0;

/// Tolerances of the ILS capture predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IlsLimits {
    /// Max difference between aircraft heading and runway heading, deg.
    pub heading_tolerance_deg: f64,
    /// Max distance from the threshold, NM.
    pub max_distance_nm: f64,
    /// How far above the glideslope an aircraft may still capture, ft.
    pub glideslope_margin_ft: f64,
    /// Max angular offset from the extended centreline seen from the aircraft, deg.
    pub localizer_tolerance_deg: f64,
}

impl Default for IlsLimits {
    fn default() -> Self {
        Self {
            heading_tolerance_deg: 30.0,
            max_distance_nm: 18.0,
            glideslope_margin_ft: 1_000.0,
            localizer_tolerance_deg: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub id: String,
    pub threshold: Vector2<f64>, // NM, local frame
    pub heading: f64,            // deg, landing direction
    #[serde(default)]
    pub elevation_ft: f64,
}

impl Runway {
    pub fn new(id: impl Into<String>, threshold: Vector2<f64>, heading: f64) -> Self {
        Self { id: id.into(), threshold, heading: normalize_heading(heading), elevation_ft: 0.0 }
    }

    pub fn with_elevation(mut self, elevation_ft: f64) -> Self {
        self.elevation_ft = elevation_ft;
        self
    }

    pub fn distance_nm(&self, position: &Vector2<f64>) -> f64 {
        (self.threshold - position).norm()
    }

    /// Glideslope altitude at the aircraft's distance from the threshold, whole feet.
    pub fn glideslope_altitude(&self, position: &Vector2<f64>) -> f64 {
        (self.distance_nm(position) * GLIDESLOPE_FT_PER_NM).floor() + self.elevation_ft
    }

    /// Signed angle between the runway heading and the bearing to the threshold.
    /// Negative when the aircraft is right of the centreline (must turn left).
    pub fn localizer_deviation(&self, position: &Vector2<f64>) -> f64 {
        heading_difference(self.heading, bearing(position, &self.threshold))
    }

    /// Heading that converges onto the extended centreline.
    pub fn localizer_heading(&self, position: &Vector2<f64>) -> f64 {
        let correction = (self.localizer_deviation(position) * LOC_INTERCEPT_GAIN)
            .clamp(-LOC_MAX_CORRECTION_DEG, LOC_MAX_CORRECTION_DEG);
        normalize_heading(self.heading + correction)
    }

    /// Along-track distance past the threshold; negative while on the approach side.
    pub fn along_track_nm(&self, position: &Vector2<f64>) -> f64 {
        (position - self.threshold).dot(&heading_vector(self.heading))
    }

    /// ILS capture predicate.
    pub fn is_aligned(
        &self,
        position: &Vector2<f64>,
        altitude: f64,
        heading: f64,
        limits: &IlsLimits,
    ) -> bool {
        let distance = self.distance_nm(position);
        self.along_track_nm(position) < 0.0
            && distance <= limits.max_distance_nm
            && heading_difference(heading, self.heading).abs() <= limits.heading_tolerance_deg
            && altitude <= self.glideslope_altitude(position) + limits.glideslope_margin_ft
            && self.localizer_deviation(position).abs() <= limits.localizer_tolerance_deg
    }
}
