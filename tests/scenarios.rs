use nalgebra::Vector2;

use airspace_sim::aircraft::{presets, AircraftBuilder, AircraftState, FlightState};
use airspace_sim::gnc::{propagate, FlightPhase, LateralMode, Pid, VerticalMode};
use airspace_sim::route::airport::presets::demo;
use airspace_sim::route::{AltitudeConstraint, FlightLeg, Runway, StaticAirport, Waypoint};
use airspace_sim::sim::{
    Command, EventKind, SeparationConfig, SeparationDetector, SeparationEvent, SeparationStatus, SimConfig,
    Simulation,
};

fn field_at_origin() -> StaticAirport {
    StaticAirport::new("TEST", Vector2::zeros())
        .with_runway(Runway::new("36", Vector2::zeros(), 360.0))
        .with_waypoint(Waypoint::new("A", Vector2::new(0.0, 30.0)))
}

fn arrival(callsign: &str, x: f64, y: f64, altitude: f64, heading: f64) -> AircraftState {
    AircraftBuilder::new(callsign, presets::a320())
        .position(x, y)
        .altitude(altitude)
        .heading(heading)
        .speed(250.0)
        .build()
}

#[test]
fn vector_to_altitude_below_holds_then_retires() {
    let apt = field_at_origin();
    let mut ac = arrival("TST1", 0.0, 0.0, 2_000.0, 360.0);
    let leg = FlightLeg::vector_to_altitude(90.0, AltitudeConstraint::below(700.0));
    ac.autopilot.activate_flight_plan(&[leg], FlightPhase::Climb, None);
    assert_eq!(ac.autopilot.mcp().altitude, 30_000.0);
    assert_eq!(ac.autopilot.plan().active().map(|l| l.altitude_target), Some(700.0));

    let mut ticks = 0;
    while !ac.autopilot.plan().is_exhausted() {
        ac.update(&apt, 1.0);
        assert_eq!(ac.command().target_altitude, 700.0, "target moved before the leg retired");
        ticks += 1;
        assert!(ticks < 120, "leg never retired");
    }
    assert_eq!(ac.altitude(), 700.0);

    let heading = ac.heading();
    ac.update(&apt, 1.0);
    assert_eq!(ac.autopilot.lateral_mode(), LateralMode::Hdg);
    assert_eq!(ac.command().target_heading, heading);
    assert_eq!(ac.command().target_altitude, 30_000.0);
}

#[test]
fn ils_capture_commands_glideslope_altitude() {
    let mut sim = Simulation::new(field_at_origin(), SimConfig::default()).unwrap();
    sim.spawn(arrival("TST1", 0.0, -10.0, 3_500.0, 360.0)).unwrap();

    let report = sim.tick(1.0);
    assert!(report
        .events
        .iter()
        .any(|e| e.kind == EventKind::IlsCaptured { runway: "36".into() }));
    let ac = sim.get("TST1").unwrap();
    assert_eq!(ac.flight_state(), FlightState::Landing);
    assert_eq!(ac.autopilot.vertical_mode(), VerticalMode::Gs);
    assert_eq!(ac.command().target_altitude, 3_184.0);
}

#[test]
fn separation_classification_table() {
    let det = SeparationDetector::new(SeparationConfig::default());
    for horizontal in [0.5, 4.9, 7.9, 20.0, 100.0] {
        assert_eq!(det.classify(horizontal, 1_000.0), SeparationStatus::Normal);
        assert_eq!(det.classify(horizontal, 2_500.0), SeparationStatus::Normal);
    }
    assert_eq!(det.classify(4.9, 0.0), SeparationStatus::Violation);
    assert_eq!(det.classify(7.9, 0.0), SeparationStatus::Warning);
    assert_eq!(det.classify(20.0, 0.0), SeparationStatus::Normal);
}

#[test]
fn converging_pair_reports_loss_once() {
    let mut sim = Simulation::new(field_at_origin(), SimConfig::default()).unwrap();
    sim.spawn(arrival("AAA1", -2.45, 20.0, 9_000.0, 90.0)).unwrap();
    sim.spawn(arrival("BBB2", 2.45, 20.0, 9_000.0, 270.0)).unwrap();

    let first = sim.tick(1.0);
    assert_eq!(first.separation.status_of("AAA1"), SeparationStatus::Violation);
    assert_eq!(
        first.separation.events.iter().filter(|e| matches!(e, SeparationEvent::Lost { .. })).count(),
        1
    );
    let second = sim.tick(1.0);
    assert_eq!(second.separation.status_of("BBB2"), SeparationStatus::Violation);
    assert!(second.separation.events.is_empty());
}

#[test]
fn step_down_lookahead() {
    let legs = [
        FlightLeg::track_to("A"),
        FlightLeg::track_to("B").with_altitude(AltitudeConstraint::at(8_000.0)),
    ];
    let resolved = propagate(&legs, 2_000.0, 250.0);
    assert_eq!(resolved[0].altitude_target, 8_000.0);
    assert_eq!(resolved[1].altitude_target, 8_000.0);
}

#[test]
fn pid_reset_reproduces_outputs() {
    let errors = [10.0, 7.5, -3.0, 0.0, 12.0, -8.0];
    let mut pid = Pid::new(1.5, 0.02, 0.2).with_limits(-30.0, 30.0);
    let first: Vec<f64> = errors.iter().map(|&e| pid.update(e, 0.5)).collect();
    pid.reset();
    let second: Vec<f64> = errors.iter().map(|&e| pid.update(e, 0.5)).collect();
    assert_eq!(first, second);
}

#[test]
fn demo_arrival_lands_on_runway_36() {
    let mut sim = Simulation::new(demo(), SimConfig::default()).unwrap();
    sim.spawn(
        AircraftBuilder::new("DAL12", presets::a320())
            .position(0.0, -16.0)
            .heading(360.0)
            .altitude(3_000.0)
            .speed(180.0)
            .build(),
    )
    .unwrap();
    assert!(sim.issue("DAL12", Command::Approach("ILS36".into())).is_applied());

    let mut events = Vec::new();
    for _ in 0..900 {
        let report = sim.tick(1.0);
        if report.events.iter().any(|e| matches!(e.kind, EventKind::IlsCaptured { .. })) {
            assert!(sim.issue("DAL12", Command::ContactTower).is_applied());
        }
        events.extend(report.events);
        if report.removed.iter().any(|c| c == "DAL12") {
            break;
        }
    }
    let kinds: Vec<&EventKind> = events.iter().map(|e| &e.kind).collect();
    assert!(kinds.contains(&&EventKind::IlsCaptured { runway: "36".into() }));
    assert!(kinds.contains(&&EventKind::TowerContact));
    assert!(kinds.contains(&&EventKind::Landed { runway: "36".into() }), "events: {:?}", kinds);
    assert!(sim.get("DAL12").is_none());
}

#[test]
fn departure_rolls_and_climbs_out() {
    let mut sim = Simulation::new(demo(), SimConfig::default()).unwrap();
    sim.spawn(
        AircraftBuilder::new("SWA7", presets::b738())
            .position(0.0, -1.0)
            .heading(360.0)
            .altitude(20.0)
            .speed(0.0)
            .flight_state(FlightState::Taxi)
            .build(),
    )
    .unwrap();
    assert!(sim.issue("SWA7", Command::Sid("FOXTR1".into())).is_applied());
    assert!(!sim.issue("SWA7", Command::Heading(90.0)).is_applied());
    assert!(sim.issue("SWA7", Command::ClearedForTakeoff).is_applied());

    let mut airborne = false;
    for _ in 0..300 {
        let report = sim.tick(1.0);
        airborne |= report.events.iter().any(|e| e.kind == EventKind::Airborne);
    }
    assert!(airborne);
    let ac = sim.get("SWA7").unwrap();
    assert_eq!(ac.flight_state(), FlightState::Flying);
    assert!(ac.altitude() > 520.0, "altitude {}", ac.altitude());
    assert!(ac.autopilot.captured_runway().is_none());
}

#[test]
fn unknown_route_leaves_plan_untouched() {
    let mut sim = Simulation::new(demo(), SimConfig::default()).unwrap();
    sim.spawn(arrival("DAL12", -30.0, 5.0, 12_000.0, 90.0)).unwrap();
    assert!(sim.issue("DAL12", Command::Star("BRAVO1".into())).is_applied());
    let before = sim.get("DAL12").unwrap().autopilot.plan().remaining_len();

    assert!(!sim.issue("DAL12", Command::Star("NOPE1".into())).is_applied());
    assert!(!sim.issue("DAL12", Command::DirectTo("ZULU".into())).is_applied());
    let ac = sim.get("DAL12").unwrap();
    assert_eq!(ac.autopilot.plan().remaining_len(), before);
    assert_eq!(ac.autopilot.lateral_mode(), LateralMode::Lnav);
}
