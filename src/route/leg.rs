use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::ALTITUDE_CAPTURE_TOLERANCE_FT;
use super::waypoint::Waypoint;

// ---------------------------------------------------------------------------
// Altitude constraints
// ---------------------------------------------------------------------------

/// How a constraint altitude bounds the path. Omitted kinds read as `At`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintKind {
    #[default]
    At,
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeConstraint {
    pub altitude: f64,
    #[serde(default)]
    pub kind: ConstraintKind,
}

impl AltitudeConstraint {
    pub fn at(altitude: f64) -> Self {
        Self { altitude, kind: ConstraintKind::At }
    }

    pub fn above(altitude: f64) -> Self {
        Self { altitude, kind: ConstraintKind::Above }
    }

    pub fn below(altitude: f64) -> Self {
        Self { altitude, kind: ConstraintKind::Below }
    }

    /// Fold this constraint into a target propagated from later legs.
    pub fn bound(&self, downstream: f64) -> f64 {
        match self.kind {
            ConstraintKind::At => self.altitude,
            ConstraintKind::Above => downstream.max(self.altitude),
            ConstraintKind::Below => downstream.min(self.altitude),
        }
    }

    /// Whether an aircraft at `altitude` has reached the constraint.
    pub fn is_reached(&self, altitude: f64) -> bool {
        match self.kind {
            ConstraintKind::At => (altitude - self.altitude).abs() <= ALTITUDE_CAPTURE_TOLERANCE_FT,
            ConstraintKind::Above => altitude >= self.altitude,
            ConstraintKind::Below => altitude <= self.altitude,
        }
    }
}

impl fmt::Display for AltitudeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ConstraintKind::At => "",
            ConstraintKind::Above => "A",
            ConstraintKind::Below => "B",
        };
        write!(f, "{}{:.0}", prefix, self.altitude)
    }
}

// ---------------------------------------------------------------------------
// Flight legs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlightLeg {
    /// VA: fly a heading until reaching an altitude.
    #[serde(rename = "VA")]
    VectorToAltitude {
        heading: f64,
        altitude: AltitudeConstraint,
        #[serde(default)]
        speed_limit: Option<f64>,
    },
    /// TF: track to a named fix.
    #[serde(rename = "TF")]
    TrackToFix {
        fix: String,
        #[serde(default)]
        altitude: Option<AltitudeConstraint>,
        #[serde(default)]
        speed_limit: Option<f64>,
    },
    /// DF: proceed direct to a named fix.
    #[serde(rename = "DF")]
    DirectToFix {
        fix: String,
        #[serde(default)]
        altitude: Option<AltitudeConstraint>,
        #[serde(default)]
        speed_limit: Option<f64>,
    },
}

impl FlightLeg {
    pub fn vector_to_altitude(heading: f64, altitude: AltitudeConstraint) -> Self {
        FlightLeg::VectorToAltitude { heading, altitude, speed_limit: None }
    }

    pub fn track_to(fix: impl Into<String>) -> Self {
        FlightLeg::TrackToFix { fix: fix.into(), altitude: None, speed_limit: None }
    }

    pub fn direct_to(fix: impl Into<String>) -> Self {
        FlightLeg::DirectToFix { fix: fix.into(), altitude: None, speed_limit: None }
    }

    /// Direct-to leg inheriting the waypoint's published restrictions.
    pub fn direct_to_waypoint(waypoint: &Waypoint) -> Self {
        FlightLeg::DirectToFix {
            fix: waypoint.name.clone(),
            altitude: waypoint.altitude,
            speed_limit: waypoint.speed_limit,
        }
    }

    pub fn with_altitude(mut self, constraint: AltitudeConstraint) -> Self {
        match &mut self {
            FlightLeg::VectorToAltitude { altitude, .. } => *altitude = constraint,
            FlightLeg::TrackToFix { altitude, .. } | FlightLeg::DirectToFix { altitude, .. } => {
                *altitude = Some(constraint)
            }
        }
        self
    }

    pub fn with_speed_limit(mut self, limit: f64) -> Self {
        match &mut self {
            FlightLeg::VectorToAltitude { speed_limit, .. }
            | FlightLeg::TrackToFix { speed_limit, .. }
            | FlightLeg::DirectToFix { speed_limit, .. } => *speed_limit = Some(limit),
        }
        self
    }

    pub fn altitude_constraint(&self) -> Option<AltitudeConstraint> {
        match self {
            FlightLeg::VectorToAltitude { altitude, .. } => Some(*altitude),
            FlightLeg::TrackToFix { altitude, .. } | FlightLeg::DirectToFix { altitude, .. } => *altitude,
        }
    }

    pub fn speed_limit(&self) -> Option<f64> {
        match self {
            FlightLeg::VectorToAltitude { speed_limit, .. }
            | FlightLeg::TrackToFix { speed_limit, .. }
            | FlightLeg::DirectToFix { speed_limit, .. } => *speed_limit,
        }
    }

    /// Named fix this leg terminates at, if any.
    pub fn fix(&self) -> Option<&str> {
        match self {
            FlightLeg::VectorToAltitude { .. } => None,
            FlightLeg::TrackToFix { fix, .. } | FlightLeg::DirectToFix { fix, .. } => Some(fix),
        }
    }
}

impl fmt::Display for FlightLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightLeg::VectorToAltitude { heading, altitude, .. } => {
                write!(f, "VA {:03.0} ({})", heading, altitude)
            }
            FlightLeg::TrackToFix { fix, .. } => write!(f, "TF {}", fix),
            FlightLeg::DirectToFix { fix, .. } => write!(f, "DF {}", fix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn constraint_kinds_bound_downstream_target() {
        assert_eq!(AltitudeConstraint::at(8_000.0).bound(2_000.0), 8_000.0);
        assert_eq!(AltitudeConstraint::above(8_000.0).bound(12_000.0), 12_000.0);
        assert_eq!(AltitudeConstraint::above(8_000.0).bound(2_000.0), 8_000.0);
        assert_eq!(AltitudeConstraint::below(8_000.0).bound(12_000.0), 8_000.0);
        assert_eq!(AltitudeConstraint::below(8_000.0).bound(2_000.0), 2_000.0);
    }

    #[test]
    fn reached_depends_on_kind() {
        assert!(AltitudeConstraint::below(700.0).is_reached(700.0));
        assert!(!AltitudeConstraint::below(700.0).is_reached(2_000.0));
        assert!(AltitudeConstraint::above(1_500.0).is_reached(1_600.0));
        assert!(AltitudeConstraint::at(5_000.0).is_reached(4_950.0));
        assert!(!AltitudeConstraint::at(5_000.0).is_reached(4_800.0));
    }

    #[test]
    fn missing_kind_deserializes_as_at() {
        let leg: FlightLeg =
            serde_yaml::from_str("type: TF\nfix: ALPHA\naltitude:\n  altitude: 3000\n").unwrap();
        assert_eq!(leg.altitude_constraint(), Some(AltitudeConstraint::at(3_000.0)));
        assert_eq!(leg.speed_limit(), None);
    }

    #[test]
    fn direct_to_waypoint_copies_restrictions() {
        let wp = Waypoint::new("BRAVO", Vector2::new(1.0, 2.0))
            .with_altitude(AltitudeConstraint::above(5_000.0))
            .with_speed_limit(210.0);
        let leg = FlightLeg::direct_to_waypoint(&wp);
        assert_eq!(leg.fix(), Some("BRAVO"));
        assert_eq!(leg.altitude_constraint(), Some(AltitudeConstraint::above(5_000.0)));
        assert_eq!(leg.speed_limit(), Some(210.0));
    }

    #[test]
    fn display_is_compact() {
        let va = FlightLeg::vector_to_altitude(90.0, AltitudeConstraint::below(700.0));
        assert_eq!(va.to_string(), "VA 090 (B700)");
        assert_eq!(FlightLeg::track_to("ALPHA").to_string(), "TF ALPHA");
    }
}
