use std::fmt;
use std::sync::Arc;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gnc::{AircraftControl, ApproachEvent, Autopilot, ControlCommand, ControlLimits};
use crate::physics::PerformanceModel;
use crate::route::Airport;
use super::types::WakeCategory;

// ---------------------------------------------------------------------------
// Flight and ownership state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightState {
    Flying,
    Landing,
    Landed,
    Takeoff,
    Taxi,
}

impl FlightState {
    pub fn is_airborne(self) -> bool {
        matches!(self, FlightState::Flying | FlightState::Landing)
    }
}

/// Handoff state, independent of [`FlightState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ownership {
    /// Inbound, not yet accepted from the adjacent sector.
    Incoming,
    #[default]
    Controlled,
    /// Told to contact tower.
    TowerHandoff,
    /// Handed off and no longer ours.
    Released,
}

impl fmt::Display for FlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlightState::Flying => "FLYING",
            FlightState::Landing => "LANDING",
            FlightState::Landed => "LANDED",
            FlightState::Takeoff => "TAKEOFF",
            FlightState::Taxi => "TAXI",
        })
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ownership::Incoming => "INCOMING",
            Ownership::Controlled => "CONTROLLED",
            Ownership::TowerHandoff => "TOWER",
            Ownership::Released => "RELEASED",
        })
    }
}

// ---------------------------------------------------------------------------
// Airframe: kinematic state plus latched commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Airframe {
    pub position: Vector2<f64>, // NM
    pub altitude: f64,          // ft
    pub heading: f64,           // deg
    pub speed: f64,             // kt
    pub bank: f64,              // deg
    pub vertical_speed: f64,    // realized, ft/min
    pub mass: f64,              // kg
    pub limits: ControlLimits,
    pub command: ControlCommand,
    pub flight_state: FlightState,
    pub(crate) performance: Arc<PerformanceModel>,
}

impl AircraftControl for Airframe {
    fn position(&self) -> Vector2<f64> {
        self.position
    }

    fn altitude(&self) -> f64 {
        self.altitude
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn speed(&self) -> f64 {
        self.speed
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn performance(&self) -> &PerformanceModel {
        &self.performance
    }

    fn limits(&self) -> ControlLimits {
        self.limits
    }

    fn flight_state(&self) -> FlightState {
        self.flight_state
    }

    fn set_flight_state(&mut self, state: FlightState) {
        self.flight_state = state;
    }

    fn apply(&mut self, command: &ControlCommand) {
        self.command = *command;
    }
}

// ---------------------------------------------------------------------------
// Aircraft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AircraftState {
    pub callsign: String,
    pub type_id: String,
    pub wake: WakeCategory,
    pub ownership: Ownership,
    pub airframe: Airframe,
    pub autopilot: Autopilot,
}

impl AircraftState {
    pub fn position(&self) -> Vector2<f64> {
        self.airframe.position
    }

    pub fn altitude(&self) -> f64 {
        self.airframe.altitude
    }

    pub fn heading(&self) -> f64 {
        self.airframe.heading
    }

    pub fn speed(&self) -> f64 {
        self.airframe.speed
    }

    pub fn flight_state(&self) -> FlightState {
        self.airframe.flight_state
    }

    pub fn performance(&self) -> &PerformanceModel {
        &self.airframe.performance
    }

    /// Commanded targets from the most recent tick.
    pub fn command(&self) -> &ControlCommand {
        &self.airframe.command
    }

    /// ILS capture / touchdown / go-around check for this tick.
    /// Tower traffic is released once it is on the ground.
    pub fn manage_approach(&mut self, airport: &dyn Airport) -> Option<ApproachEvent> {
        let event = self.autopilot.manage_approach(&mut self.airframe, airport);
        if matches!(event, Some(ApproachEvent::Touchdown { .. })) && self.ownership == Ownership::TowerHandoff {
            self.ownership = Ownership::Released;
            debug!(callsign = %self.callsign, "released to tower");
        }
        event
    }

    /// Autopilot, then physics, then route sequencing.
    pub fn update(&mut self, airport: &dyn Airport, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let _span = tracing::debug_span!("aircraft", callsign = %self.callsign).entered();
        match self.airframe.flight_state {
            FlightState::Flying | FlightState::Landing => {
                self.autopilot.update(&mut self.airframe, airport, dt);
                self.airframe.integrate(dt);
                let (position, altitude) = (self.airframe.position, self.airframe.altitude);
                if let Some(leg) = self.autopilot.plan_mut().advance(&position, altitude, airport) {
                    debug!(leg = %leg, "leg complete");
                }
            }
            FlightState::Takeoff => self.airframe.takeoff_roll(dt),
            FlightState::Taxi | FlightState::Landed => {}
        }
    }
}
