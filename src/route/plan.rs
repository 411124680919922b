use std::collections::VecDeque;

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::consts::FIX_CAPTURE_RADIUS_NM;
use super::airport::Airport;
use super::geometry::bearing;
use super::leg::FlightLeg;
use super::waypoint::Waypoint;

/// A leg annotated with the altitude/speed targets propagated from later legs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLeg {
    pub leg: FlightLeg,
    pub altitude_target: f64,
    pub speed_target: f64,
}

// ---------------------------------------------------------------------------
// Flight plan (active leg + queue)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FlightPlan {
    remaining: VecDeque<ResolvedLeg>,
    active: Option<ResolvedLeg>,
    /// Bound on first access to a TF/DF leg, cleared when the leg retires.
    active_waypoint: Option<Waypoint>,
}

impl FlightPlan {
    pub fn new(legs: Vec<ResolvedLeg>) -> Self {
        let mut remaining: VecDeque<ResolvedLeg> = legs.into();
        let active = remaining.pop_front();
        Self { remaining, active, active_waypoint: None }
    }

    pub fn active(&self) -> Option<&ResolvedLeg> {
        self.active.as_ref()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &ResolvedLeg> {
        self.remaining.iter()
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        self.active_waypoint.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.active.is_none() && self.remaining.is_empty()
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
        self.active = None;
        self.active_waypoint = None;
    }

    /// Resolve and cache the active leg's fix. `None` for VA legs or unknown fixes.
    pub fn bind_waypoint(&mut self, airport: &dyn Airport) -> Option<&Waypoint> {
        if self.active_waypoint.is_none() {
            let fix = self.active.as_ref().and_then(|l| l.leg.fix())?;
            self.active_waypoint = airport.waypoint(fix).cloned();
        }
        self.active_waypoint.as_ref()
    }

    /// Heading that flies the active leg from `position`.
    pub fn guidance_heading(&mut self, position: &Vector2<f64>, airport: &dyn Airport) -> Option<f64> {
        match self.active.as_ref().map(|l| &l.leg)? {
            FlightLeg::VectorToAltitude { heading, .. } => Some(*heading),
            FlightLeg::TrackToFix { .. } | FlightLeg::DirectToFix { .. } => {
                let wp = self.bind_waypoint(airport)?;
                Some(bearing(position, &wp.position))
            }
        }
    }

    /// Retire the active leg when its termination condition holds and activate the next.
    /// Returns the retired leg.
    pub fn advance(
        &mut self,
        position: &Vector2<f64>,
        altitude: f64,
        airport: &dyn Airport,
    ) -> Option<FlightLeg> {
        let retire = match &self.active.as_ref()?.leg {
            FlightLeg::VectorToAltitude { altitude: constraint, .. } => constraint.is_reached(altitude),
            FlightLeg::TrackToFix { fix, .. } | FlightLeg::DirectToFix { fix, .. } => {
                let fix = fix.clone();
                match self.bind_waypoint(airport) {
                    Some(wp) => wp.distance_nm(position) <= FIX_CAPTURE_RADIUS_NM,
                    None => {
                        warn!(fix = %fix, "dropping leg to unknown fix");
                        true
                    }
                }
            }
        };
        if !retire {
            return None;
        }
        let retired = self.active.take().map(|l| l.leg);
        self.active_waypoint = None;
        self.active = self.remaining.pop_front();
        if let Some(next) = &self.active {
            debug!(leg = %next.leg, "sequencing to next leg");
        }
        retired
    }

    /// Speed limit of the active leg (or its bound waypoint).
    pub fn active_speed_limit(&self) -> Option<f64> {
        let leg_limit = self.active.as_ref().and_then(|l| l.leg.speed_limit());
        leg_limit.or_else(|| self.active_waypoint.as_ref().and_then(|w| w.speed_limit))
    }

    /// Speed limit of the next leg in the queue, for lookahead deceleration.
    pub fn upcoming_speed_limit(&self) -> Option<f64> {
        self.remaining.front().and_then(|l| l.leg.speed_limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::airport::StaticAirport;
    use crate::route::leg::AltitudeConstraint;

    fn airport() -> StaticAirport {
        StaticAirport::new("TEST", Vector2::zeros())
            .with_waypoint(Waypoint::new("NORTH", Vector2::new(0.0, 10.0)))
            .with_waypoint(Waypoint::new("EAST", Vector2::new(10.0, 10.0)).with_speed_limit(220.0))
    }

    fn resolved(leg: FlightLeg) -> ResolvedLeg {
        ResolvedLeg { leg, altitude_target: 5_000.0, speed_target: 250.0 }
    }

    #[test]
    fn first_leg_becomes_active() {
        let plan = FlightPlan::new(vec![
            resolved(FlightLeg::track_to("NORTH")),
            resolved(FlightLeg::track_to("EAST").with_speed_limit(200.0)),
        ]);
        assert_eq!(plan.active().map(|l| l.leg.fix()), Some(Some("NORTH")));
        assert_eq!(plan.remaining_len(), 1);
        assert_eq!(plan.upcoming_speed_limit(), Some(200.0));
        assert!(!plan.is_exhausted());
    }

    #[test]
    fn fix_leg_steers_by_bearing_and_retires_in_radius() {
        let apt = airport();
        let mut plan = FlightPlan::new(vec![resolved(FlightLeg::track_to("NORTH"))]);
        let hdg = plan.guidance_heading(&Vector2::new(0.0, 0.0), &apt).unwrap();
        assert!(hdg.abs() < 1e-9);
        assert!(plan.active_waypoint().is_some());

        assert!(plan.advance(&Vector2::new(0.0, 5.0), 5_000.0, &apt).is_none());
        let retired = plan.advance(&Vector2::new(0.0, 9.2), 5_000.0, &apt);
        assert_eq!(retired, Some(FlightLeg::track_to("NORTH")));
        assert!(plan.is_exhausted());
        assert!(plan.active_waypoint().is_none());
    }

    #[test]
    fn va_leg_retires_on_altitude() {
        let apt = airport();
        let va = FlightLeg::vector_to_altitude(90.0, AltitudeConstraint::below(700.0));
        let mut plan = FlightPlan::new(vec![resolved(va)]);
        assert_eq!(plan.guidance_heading(&Vector2::zeros(), &apt), Some(90.0));
        assert!(plan.advance(&Vector2::zeros(), 1_500.0, &apt).is_none());
        assert!(plan.advance(&Vector2::zeros(), 700.0, &apt).is_some());
        assert!(plan.is_exhausted());
    }

    #[test]
    fn unknown_fix_is_dropped() {
        let apt = airport();
        let mut plan = FlightPlan::new(vec![
            resolved(FlightLeg::direct_to("NOWHERE")),
            resolved(FlightLeg::direct_to("EAST")),
        ]);
        assert_eq!(plan.guidance_heading(&Vector2::zeros(), &apt), None);
        assert!(plan.advance(&Vector2::zeros(), 5_000.0, &apt).is_some());
        assert_eq!(plan.active().and_then(|l| l.leg.fix()), Some("EAST"));
        plan.bind_waypoint(&apt);
        assert_eq!(plan.active_speed_limit(), Some(220.0));
    }
}
