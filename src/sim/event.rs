use nalgebra::Vector2;

use crate::aircraft::{AircraftState, FlightState, Ownership};
use crate::gnc::ApproachEvent;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of per-aircraft events reported to scoring/telemetry.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Airborne,
    IlsCaptured { runway: String },
    Landed { runway: String },
    GoAround { runway: String },
    HandoffAccepted,
    TowerContact,
    Released,
    LeftAirspace,
}

impl From<ApproachEvent> for EventKind {
    fn from(event: ApproachEvent) -> Self {
        match event {
            ApproachEvent::Captured { runway } => EventKind::IlsCaptured { runway },
            ApproachEvent::Touchdown { runway } => EventKind::Landed { runway },
            ApproachEvent::GoAround { runway } => EventKind::GoAround { runway },
        }
    }
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub callsign: String,
    pub kind: EventKind,
}

/// The fields detectors compare between consecutive ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSnapshot {
    pub callsign: String,
    pub flight_state: FlightState,
    pub ownership: Ownership,
    pub position: Vector2<f64>,
    pub altitude: f64,
}

impl From<&AircraftState> for AircraftSnapshot {
    fn from(ac: &AircraftState) -> Self {
        Self {
            callsign: ac.callsign.clone(),
            flight_state: ac.flight_state(),
            ownership: ac.ownership,
            position: ac.position(),
            altitude: ac.altitude(),
        }
    }
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive snapshots of one aircraft and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &AircraftSnapshot, current: &AircraftSnapshot) -> Option<EventKind>;
}

/// Detects the end of the takeoff roll.
pub struct AirborneDetector;

impl EventDetector for AirborneDetector {
    fn check(&mut self, prev: &AircraftSnapshot, current: &AircraftSnapshot) -> Option<EventKind> {
        let was_on_ground = matches!(prev.flight_state, FlightState::Takeoff | FlightState::Taxi);
        if was_on_ground && current.flight_state == FlightState::Flying {
            Some(EventKind::Airborne)
        } else {
            None
        }
    }
}

/// Detects ownership transitions.
pub struct HandoffDetector;

impl EventDetector for HandoffDetector {
    fn check(&mut self, prev: &AircraftSnapshot, current: &AircraftSnapshot) -> Option<EventKind> {
        if prev.ownership == current.ownership {
            return None;
        }
        match current.ownership {
            Ownership::Controlled if prev.ownership == Ownership::Incoming => Some(EventKind::HandoffAccepted),
            Ownership::TowerHandoff => Some(EventKind::TowerContact),
            Ownership::Released => Some(EventKind::Released),
            _ => None,
        }
    }
}

/// The detectors every simulation runs.
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![Box::new(AirborneDetector), Box::new(HandoffDetector)]
}
