use std::fmt;

use tracing::warn;

use crate::aircraft::{AircraftState, FlightState, Ownership};
use crate::consts::INITIAL_CLIMB_ALTITUDE_FT;
use crate::error::{rejected, Result, SimError};
use crate::gnc::FlightPhase;
use crate::route::{Airport, FlightLeg};

/// A validated clearance effect, applied after the readback is produced.
pub type PendingUpdate = Box<dyn FnOnce(&mut AircraftState)>;

/// Lowest speed a controller may assign, kt.
const MIN_ASSIGNED_SPEED_KT: f64 = 120.0;

// ---------------------------------------------------------------------------
// Clearances
// ---------------------------------------------------------------------------

/// Typed clearance vocabulary. Text parsing happens outside the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Heading(f64),
    Altitude(f64),
    FlightLevel(u32),
    Speed(f64),
    DirectTo(String),
    Star(String),
    Sid(String),
    Approach(String),
    ContactTower,
    AcceptHandoff,
    ClearedForTakeoff,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Heading(h) => write!(f, "heading {:03.0}", h),
            Command::Altitude(a) => write!(f, "altitude {:.0}", a),
            Command::FlightLevel(fl) => write!(f, "flight level {:03}", fl),
            Command::Speed(s) => write!(f, "speed {:.0}", s),
            Command::DirectTo(fix) => write!(f, "direct {}", fix),
            Command::Star(name) => write!(f, "{} arrival", name),
            Command::Sid(name) => write!(f, "{} departure", name),
            Command::Approach(name) => write!(f, "cleared {} approach", name),
            Command::ContactTower => f.write_str("contact tower"),
            Command::AcceptHandoff => f.write_str("radar contact"),
            Command::ClearedForTakeoff => f.write_str("cleared for takeoff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied { readback: String },
    Unhandled { reason: String },
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a clearance against the aircraft and airport and defer its effects.
///
/// Nothing is mutated here; a rejected clearance leaves the aircraft untouched.
pub fn prepare(
    command: &Command,
    aircraft: &AircraftState,
    airport: &dyn Airport,
) -> Result<(String, Vec<PendingUpdate>)> {
    let state = aircraft.flight_state();
    if state == FlightState::Landed || aircraft.ownership == Ownership::Released {
        return Err(rejected!("{} is no longer under our control", aircraft.callsign));
    }
    if aircraft.ownership == Ownership::Incoming && *command != Command::AcceptHandoff {
        return Err(rejected!("{} has not been accepted yet", aircraft.callsign));
    }

    let readback = format!("{}, {}", command, aircraft.callsign);
    let updates: Vec<PendingUpdate> = match command {
        Command::Heading(heading) => {
            require_finite(*heading, "heading")?;
            require_airborne_unestablished(aircraft)?;
            let heading = *heading;
            defer(move |ac| ac.autopilot.set_heading(heading))
        }
        Command::Altitude(altitude) => altitude_update(aircraft, *altitude)?,
        Command::FlightLevel(fl) => altitude_update(aircraft, *fl as f64 * 100.0)?,
        Command::Speed(speed) => {
            require_finite(*speed, "speed")?;
            if state == FlightState::Landing {
                return Err(rejected!("{} is established, speed is on the approach", aircraft.callsign));
            }
            let max = aircraft.performance().max_operating_tas(aircraft.altitude());
            if *speed < MIN_ASSIGNED_SPEED_KT || *speed > max {
                return Err(rejected!("unable speed {:.0}, limits {:.0}-{:.0}", speed, MIN_ASSIGNED_SPEED_KT, max));
            }
            let speed = *speed;
            defer(move |ac| ac.autopilot.set_speed(speed))
        }
        Command::DirectTo(fix) => {
            require_airborne_unestablished(aircraft)?;
            let waypoint = airport
                .waypoint(fix)
                .ok_or_else(|| SimError::UnknownWaypoint(fix.clone()))?;
            let mut legs = vec![FlightLeg::direct_to_waypoint(waypoint)];
            let plan = aircraft.autopilot.plan();
            let mut after_fix = plan
                .active()
                .into_iter()
                .chain(plan.remaining())
                .map(|l| &l.leg)
                .skip_while(|l| l.fix() != Some(fix.as_str()));
            if after_fix.next().is_some() {
                legs.extend(after_fix.cloned());
            }
            defer(move |ac| ac.autopilot.proceed_direct(&legs))
        }
        Command::Star(name) => {
            require_airborne_unestablished(aircraft)?;
            let star = airport.star(name).ok_or_else(|| SimError::UnknownProcedure(name.clone()))?;
            let legs = star.legs.clone();
            defer(move |ac| {
                ac.autopilot.activate_flight_plan(&legs, FlightPhase::Descent, None)
            })
        }
        Command::Sid(name) => {
            if state == FlightState::Landing {
                return Err(rejected!("{} is on approach", aircraft.callsign));
            }
            let sid = airport.sid(name).ok_or_else(|| SimError::UnknownProcedure(name.clone()))?;
            let legs = sid.legs.clone();
            defer(move |ac| {
                ac.autopilot.activate_flight_plan(&legs, FlightPhase::Climb, None)
            })
        }
        Command::Approach(name) => {
            require_airborne_unestablished(aircraft)?;
            let approach = airport.approach(name).ok_or_else(|| SimError::UnknownProcedure(name.clone()))?;
            if airport.runway(&approach.runway).is_none() {
                return Err(SimError::UnknownRunway(approach.runway.clone()));
            }
            let (legs, runway) = (approach.legs.clone(), approach.runway.clone());
            defer(move |ac| {
                ac.autopilot.activate_flight_plan(&legs, FlightPhase::Approach, Some(runway.as_str()))
            })
        }
        Command::ContactTower => {
            if state != FlightState::Landing {
                return Err(rejected!("{} is not established on an approach", aircraft.callsign));
            }
            defer(|ac| ac.ownership = Ownership::TowerHandoff)
        }
        Command::AcceptHandoff => {
            if aircraft.ownership != Ownership::Incoming {
                return Err(rejected!("{} is already accepted", aircraft.callsign));
            }
            defer(|ac| ac.ownership = Ownership::Controlled)
        }
        Command::ClearedForTakeoff => {
            if state != FlightState::Taxi {
                return Err(rejected!("{} is not holding for departure", aircraft.callsign));
            }
            defer(|ac| {
                if ac.autopilot.plan().is_exhausted() {
                    let heading = ac.heading();
                    let initial = ac.altitude() + INITIAL_CLIMB_ALTITUDE_FT;
                    let speed = ac.autopilot.schedule().initial_climb_kt;
                    ac.autopilot.set_heading(heading);
                    if let Err(e) = ac.autopilot.set_altitude(initial, ac.airframe.altitude) {
                        warn!(error = %e, "initial climb not set");
                    }
                    ac.autopilot.set_speed(speed);
                }
                ac.airframe.flight_state = FlightState::Takeoff;
            })
        }
    };
    Ok((readback, updates))
}

fn defer(update: impl FnOnce(&mut AircraftState) + 'static) -> Vec<PendingUpdate> {
    vec![Box::new(update)]
}

fn require_finite(value: f64, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(rejected!("invalid {} {}", what, value))
    }
}

fn require_airborne_unestablished(aircraft: &AircraftState) -> Result<()> {
    match aircraft.flight_state() {
        FlightState::Flying => Ok(()),
        FlightState::Landing => Err(rejected!("{} is established on the localizer", aircraft.callsign)),
        _ => Err(rejected!("{} is not airborne", aircraft.callsign)),
    }
}

fn altitude_update(aircraft: &AircraftState, altitude: f64) -> Result<Vec<PendingUpdate>> {
    require_finite(altitude, "altitude")?;
    let ceiling = aircraft.performance().data().ceiling_ft;
    if altitude <= 0.0 || altitude > ceiling {
        return Err(rejected!("unable {:.0}, ceiling {:.0}", altitude, ceiling));
    }
    if aircraft.autopilot.vertical_mode().is_glidepath() {
        return Err(rejected!("{} is on the glideslope", aircraft.callsign));
    }
    Ok(defer(move |ac| {
        if let Err(e) = ac.autopilot.set_altitude(altitude, ac.airframe.altitude) {
            warn!(error = %e, "altitude not set");
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{presets, AircraftBuilder};
    use crate::gnc::{LateralMode, VerticalMode};
    use crate::route::airport::presets::demo;

    fn flying() -> AircraftState {
        AircraftBuilder::new("DAL12", presets::a320()).position(-30.0, 0.0).altitude(12_000.0).heading(90.0).build()
    }

    fn apply(ac: &mut AircraftState, command: Command) -> Result<String> {
        let apt = demo();
        let (readback, updates) = prepare(&command, ac, &apt)?;
        for update in updates {
            update(ac);
        }
        Ok(readback)
    }

    #[test]
    fn heading_readback_and_effect() {
        let mut ac = flying();
        let readback = apply(&mut ac, Command::Heading(45.0)).unwrap();
        assert_eq!(readback, "heading 045, DAL12");
        assert_eq!(ac.autopilot.mcp().heading, 45.0);
    }

    #[test]
    fn flight_level_converts_to_feet() {
        let mut ac = flying();
        apply(&mut ac, Command::FlightLevel(150)).unwrap();
        assert_eq!(ac.autopilot.mcp().altitude, 15_000.0);
        assert_eq!(ac.autopilot.vertical_mode(), VerticalMode::Flch);
    }

    #[test]
    fn unknown_references_leave_plan_untouched() {
        let mut ac = flying();
        apply(&mut ac, Command::Star("BRAVO1".into())).unwrap();
        let before = ac.autopilot.plan().active().cloned();
        assert!(matches!(apply(&mut ac, Command::Star("NOPE1".into())), Err(SimError::UnknownProcedure(_))));
        assert!(matches!(apply(&mut ac, Command::DirectTo("NOWHERE".into())), Err(SimError::UnknownWaypoint(_))));
        assert_eq!(ac.autopilot.plan().active().cloned(), before);
        assert_eq!(ac.autopilot.lateral_mode(), LateralMode::Lnav);
    }

    #[test]
    fn direct_to_keeps_rest_of_route() {
        let mut ac = flying();
        apply(&mut ac, Command::Approach("ILS36".into())).unwrap();
        assert_eq!(ac.autopilot.plan().remaining_len(), 1);
        apply(&mut ac, Command::DirectTo("ALPHA".into())).unwrap();
        let plan = ac.autopilot.plan();
        assert_eq!(plan.active().and_then(|l| l.leg.fix()), Some("ALPHA"));
        assert_eq!(plan.remaining_len(), 1);
        assert_eq!(ac.autopilot.armed_runway(), Some("36"));
    }

    #[test]
    fn direct_to_downstream_fix_skips_ahead() {
        let mut ac = flying();
        apply(&mut ac, Command::Star("BRAVO1".into())).unwrap();
        apply(&mut ac, Command::DirectTo("BRAVO".into())).unwrap();
        let plan = ac.autopilot.plan();
        assert_eq!(plan.active().and_then(|l| l.leg.fix()), Some("BRAVO"));
        assert_eq!(plan.remaining_len(), 0);
    }

    #[test]
    fn speed_outside_envelope_is_rejected() {
        let mut ac = flying();
        assert!(apply(&mut ac, Command::Speed(90.0)).is_err());
        assert!(apply(&mut ac, Command::Speed(900.0)).is_err());
        assert!(apply(&mut ac, Command::Speed(f64::NAN)).is_err());
        assert_eq!(ac.autopilot.mcp().speed, 250.0);
    }

    #[test]
    fn incoming_must_be_accepted_first() {
        let mut ac = flying();
        ac.ownership = Ownership::Incoming;
        assert!(apply(&mut ac, Command::Heading(10.0)).is_err());
        apply(&mut ac, Command::AcceptHandoff).unwrap();
        assert_eq!(ac.ownership, Ownership::Controlled);
        assert!(apply(&mut ac, Command::AcceptHandoff).is_err());
    }

    #[test]
    fn takeoff_clearance_starts_roll() {
        let mut ac = AircraftBuilder::new("UAL7", presets::b738())
            .position(0.0, -1.0)
            .altitude(20.0)
            .heading(360.0)
            .speed(0.0)
            .flight_state(FlightState::Taxi)
            .build();
        assert!(apply(&mut ac, Command::Heading(90.0)).is_err());
        apply(&mut ac, Command::ClearedForTakeoff).unwrap();
        assert_eq!(ac.flight_state(), FlightState::Takeoff);
        assert_eq!(ac.autopilot.mcp().altitude, 3_020.0);
        assert!(apply(&mut ac, Command::ClearedForTakeoff).is_err());
    }

    #[test]
    fn contact_tower_requires_established() {
        let mut ac = flying();
        assert!(apply(&mut ac, Command::ContactTower).is_err());
    }
}
