use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use airspace_sim::aircraft::{presets, AircraftBuilder, FlightState, Ownership};
use airspace_sim::gnc::FlightPhase;
use airspace_sim::io::TelemetryWriter;
use airspace_sim::logging::init_logging;
use airspace_sim::route::airport::presets::demo;
use airspace_sim::route::{Airport, StaticAirport};
use airspace_sim::sim::{Command, EventKind, SeparationEvent, SimConfig, Simulation};
use airspace_sim::Result;

#[derive(Parser, Debug)]
#[command(version, about, long_about = "run a scripted terminal-area traffic scenario")]
pub struct Args {
    /// Simulation config (YAML); defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Airport definition (YAML); the built-in demo field when omitted
    #[arg(short, long)]
    pub airport: Option<PathBuf>,

    /// Simulated duration, s
    #[arg(short, long, default_value_t = 1800.0)]
    pub duration: f64,

    /// Override the configured time multiplier
    #[arg(short, long)]
    pub multiplier: Option<f64>,

    /// Write per-tick telemetry to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => SimConfig::from_yaml_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(multiplier) = args.multiplier {
        config.time_multiplier = multiplier;
        config.validate()?;
    }
    let airport = match &args.airport {
        Some(path) => StaticAirport::from_yaml_file(path)?,
        None => demo(),
    };
    info!(icao = airport.icao(), "airport loaded");

    let mut sim = Simulation::new(airport, config)?;
    spawn_traffic(&mut sim)?;

    let mut telemetry = match &args.csv {
        Some(path) => Some(TelemetryWriter::create(path)?),
        None => None,
    };

    // -----------------------------------------------------------------------
    // Scripted controller
    // -----------------------------------------------------------------------
    let mut stars = assigned_stars();
    let mut landed = Vec::new();
    let mut departed = Vec::new();
    let mut losses = 0usize;
    let mut wake = 0usize;

    let dt = sim.config().dt;
    let ticks = (args.duration.max(0.0) / (dt * sim.config().time_multiplier.max(f64::EPSILON))).ceil() as usize;
    for _ in 0..ticks {
        let time = sim.time();
        let mut clearances = Vec::new();
        for ac in sim.aircraft() {
            let exhausted = ac.autopilot.plan().is_exhausted();
            match (ac.ownership, ac.flight_state()) {
                (Ownership::Incoming, _) if time >= 30.0 => {
                    clearances.push((ac.callsign.clone(), Command::AcceptHandoff));
                }
                (Ownership::Controlled, FlightState::Flying) => {
                    if let Some(star) = stars.remove(&ac.callsign) {
                        clearances.push((ac.callsign.clone(), Command::Star(star.into())));
                    } else if exhausted && ac.autopilot.phase() == Some(FlightPhase::Descent) {
                        clearances.push((ac.callsign.clone(), Command::Approach("ILS36".into())));
                    }
                }
                _ => {}
            }
        }
        for (callsign, command) in clearances {
            sim.issue(&callsign, command);
        }

        let report = sim.tick(dt);
        for event in &report.events {
            match &event.kind {
                EventKind::IlsCaptured { .. } => {
                    sim.issue(&event.callsign, Command::ContactTower);
                }
                EventKind::Landed { runway } => {
                    landed.push(format!("{} rwy {} t={:.0}s", event.callsign, runway, event.time));
                }
                EventKind::LeftAirspace => departed.push(event.callsign.clone()),
                _ => {}
            }
        }
        for event in &report.separation.events {
            match event {
                SeparationEvent::Lost { .. } => losses += 1,
                SeparationEvent::Wake { .. } => wake += 1,
                SeparationEvent::Restored { .. } => {}
            }
        }
        if let Some(writer) = telemetry.as_mut() {
            writer.record(report.time, sim.aircraft(), &report.separation)?;
        }
        if sim.aircraft().is_empty() {
            break;
        }
    }

    if let Some(writer) = telemetry {
        let rows = writer.rows();
        writer.finish()?;
        info!(rows, "telemetry written");
    }

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------
    println!();
    println!("  {} after {:.0} s", sim.airport().icao(), sim.time());
    println!("  ──────────────────────────────────────────────────────────────────");
    for line in &landed {
        println!("  LANDED    {}", line);
    }
    for callsign in &departed {
        println!("  EXITED    {}", callsign);
    }
    println!("  Separation losses: {:>4}   Wake infringements: {:>4}", losses, wake);
    println!();
    if !sim.aircraft().is_empty() {
        println!(
            "  {:>8}  {:>5}  {:>8}  {:>8}  {:>8}  {:>6}  {:>6}  {:>8}",
            "callsign", "type", "state", "x (NM)", "y (NM)", "alt", "hdg", "modes"
        );
        println!("  {}", "─".repeat(72));
        for ac in sim.aircraft() {
            println!(
                "  {:>8}  {:>5}  {:>8}  {:>8.2}  {:>8.2}  {:>6.0}  {:>6.0}  {}/{}/{}",
                ac.callsign,
                ac.type_id,
                ac.flight_state(),
                ac.position().x,
                ac.position().y,
                ac.altitude(),
                ac.heading(),
                ac.autopilot.lateral_mode(),
                ac.autopilot.vertical_mode(),
                ac.autopilot.speed_mode(),
            );
        }
        println!();
    }
    Ok(())
}

/// Arrival routes issued once each aircraft is ours and airborne.
fn assigned_stars() -> HashMap<String, &'static str> {
    HashMap::from([("DAL12".to_string(), "BRAVO1"), ("BAW41".to_string(), "CHARL1")])
}

/// Two arrivals, one still with the adjacent sector, and one departure holding at runway 36.
fn spawn_traffic(sim: &mut Simulation<StaticAirport>) -> Result<()> {
    let defaults = sim.config().autopilot.clone();
    let arrivals = [
        ("DAL12", presets::a320(), (-35.0, 12.0), 110.0, 13_000.0, Ownership::Controlled),
        ("BAW41", presets::b77w(), (35.0, 14.0), 250.0, 12_000.0, Ownership::Incoming),
    ];
    for (callsign, data, (x, y), heading, altitude, ownership) in arrivals {
        let ac = AircraftBuilder::new(callsign, data)
            .position(x, y)
            .heading(heading)
            .altitude(altitude)
            .speed(280.0)
            .ownership(ownership)
            .autopilot_defaults(defaults.clone())
            .build();
        sim.spawn(ac)?;
    }

    let Some(runway) = sim.airport().runway("36").cloned() else {
        warn!("no runway 36, departure skipped");
        return Ok(());
    };
    let departure = AircraftBuilder::new("SWA7", presets::b738())
        .position(runway.threshold.x, runway.threshold.y)
        .heading(runway.heading)
        .altitude(runway.elevation_ft)
        .speed(0.0)
        .flight_state(FlightState::Taxi)
        .autopilot_defaults(defaults)
        .build();
    sim.spawn(departure)?;
    for command in [Command::Sid("FOXTR1".into()), Command::ClearedForTakeoff] {
        if !sim.issue("SWA7", command).is_applied() {
            warn!("departure clearance refused");
        }
    }
    Ok(())
}
