use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aircraft::WakeCategory;
use crate::consts::{
    DEFAULT_WAKE_DISTANCE_NM, DEFAULT_WAKE_TIME_S, MIN_HORIZONTAL_SEPARATION_NM,
    MIN_VERTICAL_SEPARATION_FT, SEPARATION_WARNING_BUFFER_NM,
};
use crate::error::{Result, SimError};
use crate::gnc::AutopilotDefaults;

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Nominal tick length used by the demo driver, s.
    pub dt: f64,
    /// Longest single integration step; longer ticks are split, s.
    pub max_step: f64,
    /// Operator time acceleration.
    pub time_multiplier: f64,
    /// Aircraft beyond this distance from the airport centre are removed, NM.
    pub airspace_radius_nm: f64,
    pub separation: SeparationConfig,
    pub autopilot: AutopilotDefaults,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            max_step: 1.0,
            time_multiplier: 1.0,
            airspace_radius_nm: 60.0,
            separation: SeparationConfig::default(),
            autopilot: AutopilotDefaults::default(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0) {
            return Err(SimError::InvalidConfig(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.max_step > 0.0) {
            return Err(SimError::InvalidConfig(format!("max_step must be positive, got {}", self.max_step)));
        }
        if !(self.time_multiplier >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "time_multiplier must not be negative, got {}",
                self.time_multiplier
            )));
        }
        if !(self.airspace_radius_nm > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "airspace_radius_nm must be positive, got {}",
                self.airspace_radius_nm
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Separation minima
// ---------------------------------------------------------------------------

/// Minimum trailing distance/time behind a leader for one wake pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WakeMinimum {
    pub leader: WakeCategory,
    pub follower: WakeCategory,
    pub distance_nm: f64,
    pub time_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    pub horizontal_nm: f64,
    pub vertical_ft: f64,
    pub warning_buffer_nm: f64,
    pub wake_default_distance_nm: f64,
    pub wake_default_time_s: f64,
    pub wake_table: Vec<WakeMinimum>,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        use WakeCategory::*;
        let pair = |leader, follower, distance_nm, time_s| WakeMinimum { leader, follower, distance_nm, time_s };
        Self {
            horizontal_nm: MIN_HORIZONTAL_SEPARATION_NM,
            vertical_ft: MIN_VERTICAL_SEPARATION_FT,
            warning_buffer_nm: SEPARATION_WARNING_BUFFER_NM,
            wake_default_distance_nm: DEFAULT_WAKE_DISTANCE_NM,
            wake_default_time_s: DEFAULT_WAKE_TIME_S,
            wake_table: vec![
                pair(Super, Heavy, 6.0, 120.0),
                pair(Super, Medium, 7.0, 140.0),
                pair(Super, Light, 8.0, 160.0),
                pair(Heavy, Heavy, 4.0, 80.0),
                pair(Heavy, Medium, 5.0, 100.0),
                pair(Heavy, Light, 6.0, 120.0),
                pair(Medium, Light, 5.0, 100.0),
            ],
        }
    }
}

impl SeparationConfig {
    /// Trailing minimum for a follower behind a leader, (NM, s).
    pub fn wake_minimum(&self, leader: WakeCategory, follower: WakeCategory) -> (f64, f64) {
        self.wake_table
            .iter()
            .find(|w| w.leader == leader && w.follower == follower)
            .map_or((self.wake_default_distance_nm, self.wake_default_time_s), |w| (w.distance_nm, w.time_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = SimConfig::from_yaml_str("time_multiplier: 4\nseparation:\n  horizontal_nm: 3\n").unwrap();
        assert_eq!(cfg.time_multiplier, 4.0);
        assert_eq!(cfg.separation.horizontal_nm, 3.0);
        assert_eq!(cfg.separation.vertical_ft, MIN_VERTICAL_SEPARATION_FT);
        assert_eq!(cfg.max_step, 1.0);
        assert_eq!(cfg.autopilot, AutopilotDefaults::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(SimConfig::from_yaml_str("dt: 0\n"), Err(SimError::InvalidConfig(_))));
        assert!(matches!(SimConfig::from_yaml_str("max_step: -1\n"), Err(SimError::InvalidConfig(_))));
        assert!(matches!(SimConfig::from_yaml_str("dt: [1]\n"), Err(SimError::Serialization(_))));
    }

    #[test]
    fn wake_table_falls_back_to_default() {
        let sep = SeparationConfig::default();
        assert_eq!(sep.wake_minimum(WakeCategory::Heavy, WakeCategory::Light), (6.0, 120.0));
        assert_eq!(sep.wake_minimum(WakeCategory::Medium, WakeCategory::Medium), (3.0, 40.0));
    }
}
