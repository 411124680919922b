use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Wake turbulence category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WakeCategory {
    Light,
    Medium,
    Heavy,
    Super,
}

impl fmt::Display for WakeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            WakeCategory::Light => "L",
            WakeCategory::Medium => "M",
            WakeCategory::Heavy => "H",
            WakeCategory::Super => "J",
        };
        f.write_str(code)
    }
}

// ---------------------------------------------------------------------------
// Static per-type performance table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    pub type_id: String,
    pub wake: WakeCategory,
    pub empty_weight_kg: f64,
    pub max_takeoff_weight_kg: f64,
    pub max_landing_weight_kg: f64,
    pub zero_fuel_weight_kg: f64,
    pub wing_area_m2: f64,
    pub cd0: f64,               // parasite drag coefficient, clean
    pub induced_drag_k: f64,    // k in CD = CD0 + k·CL²
    pub engine_count: u32,
    pub thrust_per_engine_n: f64, // sea-level static
    pub bypass_ratio: f64,
    pub vmo_kt: f64,            // CAS
    pub mmo: f64,
    pub ceiling_ft: f64,
    pub cruise_speed_kt: f64,
    pub cruise_mach: f64,
    pub initial_climb_speed_kt: f64,
    pub rotation_speed_kt: f64,
}

impl PerformanceData {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a list of types, e.g. a fleet file.
    pub fn list_from_yaml_str(yaml: &str) -> Result<Vec<Self>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn total_sea_level_thrust(&self) -> f64 {
        self.thrust_per_engine_n * self.engine_count as f64
    }

    /// Representative mass for an outbound aircraft.
    pub fn departure_mass(&self) -> f64 {
        self.zero_fuel_weight_kg + 0.6 * (self.max_takeoff_weight_kg - self.zero_fuel_weight_kg)
    }

    /// Representative mass for an inbound aircraft.
    pub fn arrival_mass(&self) -> f64 {
        0.5 * (self.zero_fuel_weight_kg + self.max_landing_weight_kg)
    }
}

// ---------------------------------------------------------------------------
// Preset types
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    pub fn a320() -> PerformanceData {
        PerformanceData {
            type_id: "A320".into(),
            wake: WakeCategory::Medium,
            empty_weight_kg: 42_600.0,
            max_takeoff_weight_kg: 78_000.0,
            max_landing_weight_kg: 66_000.0,
            zero_fuel_weight_kg: 62_500.0,
            wing_area_m2: 122.6,
            cd0: 0.024,
            induced_drag_k: 0.042,
            engine_count: 2,
            thrust_per_engine_n: 120_000.0,
            bypass_ratio: 5.7,
            vmo_kt: 350.0,
            mmo: 0.82,
            ceiling_ft: 39_800.0,
            cruise_speed_kt: 290.0,
            cruise_mach: 0.78,
            initial_climb_speed_kt: 180.0,
            rotation_speed_kt: 145.0,
        }
    }

    pub fn b738() -> PerformanceData {
        PerformanceData {
            type_id: "B738".into(),
            wake: WakeCategory::Medium,
            empty_weight_kg: 41_400.0,
            max_takeoff_weight_kg: 79_000.0,
            max_landing_weight_kg: 66_300.0,
            zero_fuel_weight_kg: 62_700.0,
            wing_area_m2: 124.6,
            cd0: 0.024,
            induced_drag_k: 0.045,
            engine_count: 2,
            thrust_per_engine_n: 121_400.0,
            bypass_ratio: 5.1,
            vmo_kt: 340.0,
            mmo: 0.82,
            ceiling_ft: 41_000.0,
            cruise_speed_kt: 290.0,
            cruise_mach: 0.785,
            initial_climb_speed_kt: 180.0,
            rotation_speed_kt: 150.0,
        }
    }

    pub fn e190() -> PerformanceData {
        PerformanceData {
            type_id: "E190".into(),
            wake: WakeCategory::Medium,
            empty_weight_kg: 28_000.0,
            max_takeoff_weight_kg: 51_800.0,
            max_landing_weight_kg: 44_000.0,
            zero_fuel_weight_kg: 40_800.0,
            wing_area_m2: 92.5,
            cd0: 0.025,
            induced_drag_k: 0.048,
            engine_count: 2,
            thrust_per_engine_n: 82_300.0,
            bypass_ratio: 5.0,
            vmo_kt: 320.0,
            mmo: 0.82,
            ceiling_ft: 41_000.0,
            cruise_speed_kt: 280.0,
            cruise_mach: 0.78,
            initial_climb_speed_kt: 170.0,
            rotation_speed_kt: 135.0,
        }
    }

    pub fn b77w() -> PerformanceData {
        PerformanceData {
            type_id: "B77W".into(),
            wake: WakeCategory::Heavy,
            empty_weight_kg: 167_800.0,
            max_takeoff_weight_kg: 351_500.0,
            max_landing_weight_kg: 251_300.0,
            zero_fuel_weight_kg: 237_700.0,
            wing_area_m2: 436.8,
            cd0: 0.022,
            induced_drag_k: 0.045,
            engine_count: 2,
            thrust_per_engine_n: 513_000.0,
            bypass_ratio: 8.7,
            vmo_kt: 330.0,
            mmo: 0.89,
            ceiling_ft: 43_100.0,
            cruise_speed_kt: 300.0,
            cruise_mach: 0.84,
            initial_climb_speed_kt: 190.0,
            rotation_speed_kt: 165.0,
        }
    }

    pub fn a388() -> PerformanceData {
        PerformanceData {
            type_id: "A388".into(),
            wake: WakeCategory::Super,
            empty_weight_kg: 277_000.0,
            max_takeoff_weight_kg: 575_000.0,
            max_landing_weight_kg: 394_000.0,
            zero_fuel_weight_kg: 369_000.0,
            wing_area_m2: 845.0,
            cd0: 0.021,
            induced_drag_k: 0.05,
            engine_count: 4,
            thrust_per_engine_n: 311_000.0,
            bypass_ratio: 8.5,
            vmo_kt: 340.0,
            mmo: 0.89,
            ceiling_ft: 43_000.0,
            cruise_speed_kt: 300.0,
            cruise_mach: 0.85,
            initial_climb_speed_kt: 190.0,
            rotation_speed_kt: 160.0,
        }
    }

    /// All built-in types.
    pub fn all() -> Vec<PerformanceData> {
        vec![a320(), b738(), e190(), b77w(), a388()]
    }

    /// Look up a built-in type by its ICAO designator.
    pub fn lookup(type_id: &str) -> Option<PerformanceData> {
        all().into_iter().find(|d| d.type_id.eq_ignore_ascii_case(type_id))
    }
}
