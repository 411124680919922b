use std::sync::Arc;

use nalgebra::Vector2;

use crate::gnc::{AutopilotDefaults, Autopilot, ControlCommand, ControlLimits, SpeedSchedule};
use crate::physics::PerformanceModel;
use crate::route::geometry::normalize_heading;
use super::state::{AircraftState, Airframe, FlightState, Ownership};
use super::types::PerformanceData;

// ---------------------------------------------------------------------------
// Aircraft builder
// ---------------------------------------------------------------------------

/// Spawns an [`AircraftState`] with the autopilot seeded from its initial kinematics.
pub struct AircraftBuilder {
    callsign: String,
    data: PerformanceData,
    performance: Option<Arc<PerformanceModel>>,
    position: Vector2<f64>,
    altitude: f64,
    heading: f64,
    speed: f64,
    mass: Option<f64>,
    limits: ControlLimits,
    flight_state: FlightState,
    ownership: Ownership,
    defaults: AutopilotDefaults,
}

impl AircraftBuilder {
    pub fn new(callsign: impl Into<String>, data: PerformanceData) -> Self {
        Self {
            callsign: callsign.into(),
            data,
            performance: None,
            position: Vector2::zeros(),
            altitude: 10_000.0,
            heading: 0.0,
            speed: 250.0,
            mass: None,
            limits: ControlLimits::default(),
            flight_state: FlightState::Flying,
            ownership: Ownership::Controlled,
            defaults: AutopilotDefaults::default(),
        }
    }

    /// Share one performance model between every aircraft of a type.
    pub fn shared_performance(mut self, model: Arc<PerformanceModel>) -> Self {
        self.data = model.data().clone();
        self.performance = Some(model);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self { self.position = Vector2::new(x, y); self }
    pub fn altitude(mut self, v: f64) -> Self { self.altitude = v; self }
    pub fn heading(mut self, v: f64) -> Self { self.heading = normalize_heading(v); self }
    pub fn speed(mut self, v: f64) -> Self { self.speed = v.max(0.0); self }
    pub fn mass(mut self, v: f64) -> Self { self.mass = Some(v); self }
    pub fn limits(mut self, v: ControlLimits) -> Self { self.limits = v; self }
    pub fn flight_state(mut self, v: FlightState) -> Self { self.flight_state = v; self }
    pub fn ownership(mut self, v: Ownership) -> Self { self.ownership = v; self }
    pub fn autopilot_defaults(mut self, v: AutopilotDefaults) -> Self { self.defaults = v; self }

    pub fn build(self) -> AircraftState {
        let mass = self.mass.unwrap_or_else(|| match self.flight_state {
            FlightState::Takeoff | FlightState::Taxi => self.data.departure_mass(),
            _ => self.data.arrival_mass(),
        });
        let autopilot = Autopilot::new(self.heading, self.altitude, self.speed)
            .with_schedule(SpeedSchedule::for_type(&self.data))
            .with_defaults(self.defaults);
        let command = ControlCommand {
            target_heading: self.heading,
            target_altitude: self.altitude,
            target_speed: self.speed,
            ..Default::default()
        };
        let performance = self
            .performance
            .unwrap_or_else(|| Arc::new(PerformanceModel::new(self.data.clone())));

        AircraftState {
            callsign: self.callsign,
            type_id: self.data.type_id.clone(),
            wake: self.data.wake,
            ownership: self.ownership,
            airframe: Airframe {
                position: self.position,
                altitude: self.altitude,
                heading: self.heading,
                speed: self.speed,
                bank: 0.0,
                vertical_speed: 0.0,
                mass,
                limits: self.limits,
                command,
                flight_state: self.flight_state,
                performance,
            },
            autopilot,
        }
    }
}
