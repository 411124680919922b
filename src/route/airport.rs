use std::collections::HashMap;
use std::path::Path;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use super::leg::{AltitudeConstraint, FlightLeg};
use super::waypoint::{Runway, Waypoint};

/// Minutes of arc per degree; one minute of latitude is one nautical mile.
const NM_PER_DEGREE: f64 = 60.0;

// ---------------------------------------------------------------------------
// Airport collaborator
// ---------------------------------------------------------------------------

/// Named, ordered leg list (SID or STAR).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub legs: Vec<FlightLeg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    pub name: String,
    pub runway: String,
    pub legs: Vec<FlightLeg>,
}

/// Read-only airport database consumed by the core.
pub trait Airport {
    fn icao(&self) -> &str;
    /// Centre of the controlled airspace in the local frame.
    fn center(&self) -> Vector2<f64>;
    fn waypoint(&self, name: &str) -> Option<&Waypoint>;
    fn runways(&self) -> &[Runway];
    fn sid(&self, name: &str) -> Option<&Procedure>;
    fn star(&self, name: &str) -> Option<&Procedure>;
    fn approach(&self, name: &str) -> Option<&Approach>;

    fn runway(&self, id: &str) -> Option<&Runway> {
        self.runways().iter().find(|r| r.id == id)
    }
}

// ---------------------------------------------------------------------------
// Geodetic to local transform (load time only)
// ---------------------------------------------------------------------------

/// Equirectangular projection about a reference point, rotated so +y is magnetic north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub reference_lat: f64,
    pub reference_lon: f64,
    /// East variation positive, deg.
    #[serde(default)]
    pub magnetic_variation_deg: f64,
}

impl GeoTransform {
    pub fn new(reference_lat: f64, reference_lon: f64, magnetic_variation_deg: f64) -> Self {
        Self { reference_lat, reference_lon, magnetic_variation_deg }
    }

    pub fn to_local_nm(&self, lat: f64, lon: f64) -> Vector2<f64> {
        let x = (lon - self.reference_lon) * NM_PER_DEGREE * self.reference_lat.to_radians().cos();
        let y = (lat - self.reference_lat) * NM_PER_DEGREE;
        let (s, c) = self.magnetic_variation_deg.to_radians().sin_cos();
        Vector2::new(x * c - y * s, x * s + y * c)
    }
}

// ---------------------------------------------------------------------------
// In-memory airport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StaticAirport {
    icao: String,
    center: Vector2<f64>,
    waypoints: HashMap<String, Waypoint>,
    runways: Vec<Runway>,
    sids: HashMap<String, Procedure>,
    stars: HashMap<String, Procedure>,
    approaches: HashMap<String, Approach>,
}

impl StaticAirport {
    pub fn new(icao: impl Into<String>, center: Vector2<f64>) -> Self {
        Self { icao: icao.into(), center, ..Default::default() }
    }

    pub fn with_waypoint(mut self, waypoint: Waypoint) -> Self {
        self.waypoints.insert(waypoint.name.clone(), waypoint);
        self
    }

    pub fn with_runway(mut self, runway: Runway) -> Self {
        self.runways.push(runway);
        self
    }

    pub fn with_sid(mut self, sid: Procedure) -> Self {
        self.sids.insert(sid.name.clone(), sid);
        self
    }

    pub fn with_star(mut self, star: Procedure) -> Self {
        self.stars.insert(star.name.clone(), star);
        self
    }

    pub fn with_approach(mut self, approach: Approach) -> Self {
        self.approaches.insert(approach.name.clone(), approach);
        self
    }

    pub fn sid_names(&self) -> impl Iterator<Item = &str> {
        self.sids.keys().map(String::as_str)
    }

    pub fn star_names(&self) -> impl Iterator<Item = &str> {
        self.stars.keys().map(String::as_str)
    }

    /// Project a geodetic definition into the local frame and check every
    /// procedure references known fixes and runways.
    pub fn from_definition(def: AirportDefinition) -> Result<Self> {
        let geo = def.reference;
        let mut airport = Self::new(def.icao, Vector2::zeros());
        for wp in def.waypoints {
            let mut waypoint = Waypoint::new(wp.name, geo.to_local_nm(wp.lat, wp.lon));
            waypoint.altitude = wp.altitude;
            waypoint.speed_limit = wp.speed_limit;
            airport = airport.with_waypoint(waypoint);
        }
        for rwy in def.runways {
            let threshold = geo.to_local_nm(rwy.lat, rwy.lon);
            airport = airport.with_runway(Runway::new(rwy.id, threshold, rwy.heading).with_elevation(rwy.elevation_ft));
        }
        for sid in def.sids {
            airport.check_legs(&sid.name, &sid.legs)?;
            airport = airport.with_sid(sid);
        }
        for star in def.stars {
            airport.check_legs(&star.name, &star.legs)?;
            airport = airport.with_star(star);
        }
        for app in def.approaches {
            if airport.runway(&app.runway).is_none() {
                return Err(SimError::UnknownRunway(format!("{} (approach {})", app.runway, app.name)));
            }
            airport.check_legs(&app.name, &app.legs)?;
            airport = airport.with_approach(app);
        }
        Ok(airport)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_definition(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    fn check_legs(&self, procedure: &str, legs: &[FlightLeg]) -> Result<()> {
        for fix in legs.iter().filter_map(FlightLeg::fix) {
            if !self.waypoints.contains_key(fix) {
                return Err(SimError::UnknownWaypoint(format!("{} (in {})", fix, procedure)));
            }
        }
        Ok(())
    }
}

impl Airport for StaticAirport {
    fn icao(&self) -> &str {
        &self.icao
    }

    fn center(&self) -> Vector2<f64> {
        self.center
    }

    fn waypoint(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.get(name)
    }

    fn runways(&self) -> &[Runway] {
        &self.runways
    }

    fn sid(&self, name: &str) -> Option<&Procedure> {
        self.sids.get(name)
    }

    fn star(&self, name: &str) -> Option<&Procedure> {
        self.stars.get(name)
    }

    fn approach(&self, name: &str) -> Option<&Approach> {
        self.approaches.get(name)
    }
}

// ---------------------------------------------------------------------------
// Serialized airport data (geodetic)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AirportDefinition {
    pub icao: String,
    pub reference: GeoTransform,
    #[serde(default)]
    pub waypoints: Vec<GeoWaypoint>,
    #[serde(default)]
    pub runways: Vec<GeoRunway>,
    #[serde(default)]
    pub sids: Vec<Procedure>,
    #[serde(default)]
    pub stars: Vec<Procedure>,
    #[serde(default)]
    pub approaches: Vec<Approach>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoWaypoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub altitude: Option<AltitudeConstraint>,
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoRunway {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Landing direction in the magnetic local frame, deg.
    pub heading: f64,
    #[serde(default)]
    pub elevation_ft: f64,
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Single-runway field with two STARs, one SID and an ILS.
    pub fn demo() -> StaticAirport {
        let wp = |name: &str, x: f64, y: f64| Waypoint::new(name, Vector2::new(x, y));
        StaticAirport::new("XDEM", Vector2::zeros())
            .with_runway(Runway::new("36", Vector2::new(0.0, -1.0), 360.0).with_elevation(20.0))
            .with_runway(Runway::new("18", Vector2::new(0.0, 1.0), 180.0).with_elevation(20.0))
            .with_waypoint(wp("ALPHA", 0.0, -12.0))
            .with_waypoint(wp("FINAL", 0.0, -6.0))
            .with_waypoint(wp("BRAVO", -10.0, -20.0))
            .with_waypoint(wp("CHARL", 10.0, -20.0))
            .with_waypoint(wp("DELTA", -20.0, 5.0))
            .with_waypoint(wp("ECHO", 20.0, 5.0))
            .with_waypoint(wp("FOXTR", 0.0, 20.0))
            .with_waypoint(wp("GOLF", -15.0, 25.0))
            .with_star(Procedure {
                name: "BRAVO1".into(),
                legs: vec![
                    FlightLeg::track_to("DELTA")
                        .with_altitude(AltitudeConstraint::above(10_000.0))
                        .with_speed_limit(250.0),
                    FlightLeg::track_to("BRAVO")
                        .with_altitude(AltitudeConstraint::at(5_000.0))
                        .with_speed_limit(210.0),
                ],
            })
            .with_star(Procedure {
                name: "CHARL1".into(),
                legs: vec![
                    FlightLeg::track_to("ECHO")
                        .with_altitude(AltitudeConstraint::above(9_000.0))
                        .with_speed_limit(250.0),
                    FlightLeg::track_to("CHARL")
                        .with_altitude(AltitudeConstraint::at(5_000.0))
                        .with_speed_limit(210.0),
                ],
            })
            .with_approach(Approach {
                name: "ILS36".into(),
                runway: "36".into(),
                legs: vec![
                    FlightLeg::track_to("ALPHA")
                        .with_altitude(AltitudeConstraint::at(3_000.0))
                        .with_speed_limit(180.0),
                    FlightLeg::track_to("FINAL"),
                ],
            })
            .with_sid(Procedure {
                name: "FOXTR1".into(),
                legs: vec![
                    FlightLeg::vector_to_altitude(360.0, AltitudeConstraint::above(1_500.0)),
                    FlightLeg::track_to("FOXTR")
                        .with_altitude(AltitudeConstraint::above(6_000.0))
                        .with_speed_limit(250.0),
                    FlightLeg::track_to("GOLF"),
                ],
            })
    }
}
