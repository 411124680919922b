use nalgebra::Vector2;

use crate::aircraft::state::FlightState;
use crate::physics::PerformanceModel;

/// Physical limits of an airframe the autopilot shapes its commands to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    pub turn_rate_dps: f64,
    pub max_climb_fps: f64,
    pub acceleration_kts: f64,
    pub max_bank_deg: f64,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self { turn_rate_dps: 3.0, max_climb_fps: 100.0, acceleration_kts: 2.0, max_bank_deg: 25.0 }
    }
}

/// Targets and attitude commands produced by the autopilot for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlCommand {
    pub target_heading: f64,
    pub target_altitude: f64,
    pub target_speed: f64,
    pub bank_deg: f64,
    pub vertical_speed_fpm: f64,
}

/// The slice of an aircraft the autopilot may read and write.
///
/// The aircraft owns its autopilot; the autopilot only ever sees the
/// aircraft through this trait.
pub trait AircraftControl {
    fn position(&self) -> Vector2<f64>;
    fn altitude(&self) -> f64;
    fn heading(&self) -> f64;
    fn speed(&self) -> f64;
    fn mass(&self) -> f64;
    fn performance(&self) -> &PerformanceModel;
    fn limits(&self) -> ControlLimits;

    fn flight_state(&self) -> FlightState;
    fn set_flight_state(&mut self, state: FlightState);

    /// Latch the commands the integrator follows on its next step.
    fn apply(&mut self, command: &ControlCommand);
}
