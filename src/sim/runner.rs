use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::aircraft::{AircraftState, FlightState};
use crate::error::{Result, SimError};
use crate::route::Airport;
use super::command::{prepare, Command, CommandOutcome};
use super::config::SimConfig;
use super::event::{default_detectors, AircraftSnapshot, EventDetector, EventKind, SimEvent};
use super::separation::{SeparationContext, SeparationDetector, SeparationReport};

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub time: f64,
    /// Simulated seconds covered by this tick after time scaling.
    pub elapsed: f64,
    pub steps: usize,
    pub events: Vec<SimEvent>,
    pub separation: SeparationReport,
    /// Aircraft removed from the live set this tick.
    pub removed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Live aircraft set, airport and separation state for one scenario.
pub struct Simulation<A: Airport> {
    config: SimConfig,
    airport: A,
    aircraft: Vec<AircraftState>,
    detector: SeparationDetector,
    separation: SeparationContext,
    detectors: Vec<Box<dyn EventDetector>>,
    /// State as of the end of the last tick, so clearances issued between ticks are detected.
    snapshots: HashMap<String, AircraftSnapshot>,
    time: f64,
}

impl<A: Airport> Simulation<A> {
    /// Fails on an invalid config; a zero `max_step` would never finish a tick.
    pub fn new(airport: A, config: SimConfig) -> Result<Self> {
        config.validate()?;
        let detector = SeparationDetector::new(config.separation.clone());
        Ok(Self {
            config,
            airport,
            aircraft: Vec::new(),
            detector,
            separation: SeparationContext::default(),
            detectors: default_detectors(),
            snapshots: HashMap::new(),
            time: 0.0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn airport(&self) -> &A {
        &self.airport
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn aircraft(&self) -> &[AircraftState] {
        &self.aircraft
    }

    pub fn get(&self, callsign: &str) -> Option<&AircraftState> {
        self.aircraft.iter().find(|a| a.callsign == callsign)
    }

    pub fn get_mut(&mut self, callsign: &str) -> Option<&mut AircraftState> {
        self.aircraft.iter_mut().find(|a| a.callsign == callsign)
    }

    pub fn set_time_multiplier(&mut self, multiplier: f64) {
        self.config.time_multiplier = multiplier.max(0.0);
    }

    pub fn add_detector(&mut self, detector: Box<dyn EventDetector>) {
        self.detectors.push(detector);
    }

    pub fn spawn(&mut self, aircraft: AircraftState) -> Result<()> {
        if self.get(&aircraft.callsign).is_some() {
            return Err(SimError::DuplicateCallsign(aircraft.callsign));
        }
        info!(
            callsign = %aircraft.callsign,
            kind = %aircraft.type_id,
            state = %aircraft.flight_state(),
            "spawned"
        );
        self.aircraft.push(aircraft);
        Ok(())
    }

    /// Validate a clearance, read it back, then apply its deferred effects.
    pub fn issue(&mut self, callsign: &str, command: Command) -> CommandOutcome {
        let Some(index) = self.aircraft.iter().position(|a| a.callsign == callsign) else {
            let reason = SimError::UnknownAircraft(callsign.to_string()).to_string();
            warn!(%callsign, %reason, "command unhandled");
            return CommandOutcome::Unhandled { reason };
        };
        match prepare(&command, &self.aircraft[index], &self.airport) {
            Ok((readback, updates)) => {
                info!(%callsign, %readback, "clearance");
                let aircraft = &mut self.aircraft[index];
                for update in updates {
                    update(aircraft);
                }
                CommandOutcome::Applied { readback }
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(%callsign, %reason, "command unhandled");
                CommandOutcome::Unhandled { reason }
            }
        }
    }

    /// Advance by `elapsed` wall seconds, scaled by the time multiplier.
    pub fn tick(&mut self, elapsed: f64) -> TickReport {
        let scaled = elapsed.max(0.0) * self.config.time_multiplier;
        let mut report = TickReport { elapsed: scaled, ..Default::default() };
        if !(scaled > 0.0) || !scaled.is_finite() {
            report.time = self.time;
            report.separation = self.detector.scan(&self.aircraft, &mut self.separation);
            return report;
        }

        let before: HashMap<String, AircraftSnapshot> = self
            .aircraft
            .iter()
            .map(|a| {
                let prev = self.snapshots.get(&a.callsign).cloned().unwrap_or_else(|| AircraftSnapshot::from(a));
                (a.callsign.clone(), prev)
            })
            .collect();

        let steps = (scaled / self.config.max_step).ceil().max(1.0) as usize;
        let dt = scaled / steps as f64;
        for _ in 0..steps {
            self.time += dt;
            for ac in self.aircraft.iter_mut() {
                if let Some(event) = ac.manage_approach(&self.airport) {
                    report.events.push(SimEvent {
                        time: self.time,
                        callsign: ac.callsign.clone(),
                        kind: event.into(),
                    });
                }
                ac.update(&self.airport, dt);
            }
        }
        report.steps = steps;
        report.time = self.time;

        report.separation = self.detector.scan(&self.aircraft, &mut self.separation);

        for ac in &self.aircraft {
            let Some(prev) = before.get(&ac.callsign) else { continue };
            let current = AircraftSnapshot::from(ac);
            for detector in self.detectors.iter_mut() {
                if let Some(kind) = detector.check(prev, &current) {
                    report.events.push(SimEvent { time: self.time, callsign: ac.callsign.clone(), kind });
                }
            }
        }

        self.remove_finished(&mut report);
        self.snapshots =
            self.aircraft.iter().map(|a| (a.callsign.clone(), AircraftSnapshot::from(a))).collect();
        report
    }

    /// Drop landed aircraft and those beyond the airspace radius.
    fn remove_finished(&mut self, report: &mut TickReport) {
        let center = self.airport.center();
        let radius = self.config.airspace_radius_nm;
        let time = self.time;
        self.aircraft.retain(|ac| {
            let landed = ac.flight_state() == FlightState::Landed;
            let outside = (ac.position() - center).norm() > radius;
            if !(landed || outside) {
                return true;
            }
            if outside && !landed {
                debug!(callsign = %ac.callsign, "left the airspace");
                report.events.push(SimEvent { time, callsign: ac.callsign.clone(), kind: EventKind::LeftAirspace });
            }
            report.removed.push(ac.callsign.clone());
            false
        });
    }
}
