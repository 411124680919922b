use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::aircraft::{AircraftState, FlightState};
use super::config::SeparationConfig;

// ---------------------------------------------------------------------------
// Status and pair identity
// ---------------------------------------------------------------------------

/// Ordered from best to worst so the worst status of a set is its max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum SeparationStatus {
    #[default]
    Normal,
    Warning,
    Violation,
}

impl fmt::Display for SeparationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeparationStatus::Normal => "NORMAL",
            SeparationStatus::Warning => "WARNING",
            SeparationStatus::Violation => "VIOLATION",
        })
    }
}

/// Unordered pair of callsigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn contains(&self, callsign: &str) -> bool {
        self.0 == callsign || self.1 == callsign
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSeparation {
    pub pair: PairKey,
    pub horizontal_nm: f64,
    pub vertical_ft: f64,
    pub status: SeparationStatus,
}

/// Edge-triggered separation transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SeparationEvent {
    Lost { pair: PairKey, horizontal_nm: f64, vertical_ft: f64 },
    Restored { pair: PairKey },
    Wake { leader: String, follower: String, distance_nm: f64, required_nm: f64 },
}

/// Violating pairs carried between ticks. One per simulation.
#[derive(Debug, Clone, Default)]
pub struct SeparationContext {
    violating: HashSet<PairKey>,
    wake_violating: HashSet<PairKey>,
}

impl SeparationContext {
    pub fn is_violating(&self, pair: &PairKey) -> bool {
        self.violating.contains(pair)
    }

    pub fn violation_count(&self) -> usize {
        self.violating.len()
    }

    pub fn clear(&mut self) {
        self.violating.clear();
        self.wake_violating.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeparationReport {
    /// Pairs currently in warning or violation.
    pub pairs: Vec<PairSeparation>,
    /// Worst status per callsign; aircraft absent from the map are Normal.
    pub per_aircraft: HashMap<String, SeparationStatus>,
    pub events: Vec<SeparationEvent>,
}

impl SeparationReport {
    pub fn status_of(&self, callsign: &str) -> SeparationStatus {
        self.per_aircraft.get(callsign).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SeparationDetector {
    config: SeparationConfig,
}

impl SeparationDetector {
    pub fn new(config: SeparationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeparationConfig {
        &self.config
    }

    /// Status for a pair at the given distances.
    pub fn classify(&self, horizontal_nm: f64, vertical_ft: f64) -> SeparationStatus {
        if vertical_ft.abs() >= self.config.vertical_ft {
            SeparationStatus::Normal
        } else if horizontal_nm < self.config.horizontal_nm {
            SeparationStatus::Violation
        } else if horizontal_nm < self.config.horizontal_nm + self.config.warning_buffer_nm {
            SeparationStatus::Warning
        } else {
            SeparationStatus::Normal
        }
    }

    /// Scan every airborne pair once. Lost/Restored fire only on transitions.
    pub fn scan(&self, aircraft: &[AircraftState], ctx: &mut SeparationContext) -> SeparationReport {
        let mut report = SeparationReport::default();
        let airborne: Vec<&AircraftState> =
            aircraft.iter().filter(|a| a.flight_state().is_airborne()).collect();

        let mut violating_now = HashSet::new();
        for (i, a) in airborne.iter().enumerate() {
            for b in &airborne[i + 1..] {
                let horizontal_nm = (a.position() - b.position()).norm();
                let vertical_ft = (a.altitude() - b.altitude()).abs();
                let status = self.classify(horizontal_nm, vertical_ft);
                if status == SeparationStatus::Normal {
                    continue;
                }
                let pair = PairKey::new(&a.callsign, &b.callsign);
                for callsign in [&a.callsign, &b.callsign] {
                    let worst = report.per_aircraft.entry(callsign.clone()).or_default();
                    *worst = (*worst).max(status);
                }
                if status == SeparationStatus::Violation {
                    if !ctx.violating.contains(&pair) {
                        warn!(pair = %pair, horizontal_nm, vertical_ft, "separation lost");
                        report.events.push(SeparationEvent::Lost {
                            pair: pair.clone(),
                            horizontal_nm,
                            vertical_ft,
                        });
                    }
                    violating_now.insert(pair.clone());
                }
                report.pairs.push(PairSeparation { pair, horizontal_nm, vertical_ft, status });
            }
        }

        let live: HashSet<&str> = airborne.iter().map(|a| a.callsign.as_str()).collect();
        let mut restored: Vec<&PairKey> = ctx
            .violating
            .iter()
            .filter(|p| !violating_now.contains(*p))
            .filter(|p| live.contains(p.first()) && live.contains(p.second()))
            .collect();
        restored.sort();
        for pair in restored {
            info!(pair = %pair, "separation restored");
            report.events.push(SeparationEvent::Restored { pair: pair.clone() });
        }
        ctx.violating = violating_now;

        self.scan_wake(&airborne, ctx, &mut report);
        report
    }

    /// Trailing wake minima between aircraft landing on the same runway.
    fn scan_wake(&self, airborne: &[&AircraftState], ctx: &mut SeparationContext, report: &mut SeparationReport) {
        let mut by_runway: HashMap<&str, Vec<(&AircraftState, f64)>> = HashMap::new();
        for &ac in airborne.iter().filter(|a| a.flight_state() == FlightState::Landing) {
            if let Some(rwy) = ac.autopilot.captured_runway() {
                let distance = rwy.distance_nm(&ac.position());
                by_runway.entry(rwy.id.as_str()).or_default().push((ac, distance));
            }
        }

        let mut wake_now = HashSet::new();
        for sequence in by_runway.values_mut() {
            sequence.sort_by(|a, b| a.1.total_cmp(&b.1));
            for window in sequence.windows(2) {
                let (leader, follower) = (window[0].0, window[1].0);
                let (required_nm, required_s) = self.config.wake_minimum(leader.wake, follower.wake);
                let distance_nm = (leader.position() - follower.position()).norm();
                let gap_s = if follower.speed() > 0.0 {
                    distance_nm / follower.speed() * 3600.0
                } else {
                    f64::INFINITY
                };
                if distance_nm >= required_nm || gap_s >= required_s {
                    continue;
                }
                let pair = PairKey::new(&leader.callsign, &follower.callsign);
                if !ctx.wake_violating.contains(&pair) {
                    warn!(leader = %leader.callsign, follower = %follower.callsign, distance_nm, "wake separation infringed");
                    report.events.push(SeparationEvent::Wake {
                        leader: leader.callsign.clone(),
                        follower: follower.callsign.clone(),
                        distance_nm,
                        required_nm,
                    });
                }
                wake_now.insert(pair);
            }
        }
        ctx.wake_violating = wake_now;
    }
}
