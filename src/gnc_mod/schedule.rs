use serde::{Deserialize, Serialize};

use crate::aircraft::types::PerformanceData;
use crate::consts::{
    BELOW_FL100_SPEED_LIMIT_KT, INITIAL_CLIMB_ALTITUDE_FT, MACH_TRANSITION_ALTITUDE_FT,
    SPEED_LIMIT_ALTITUDE_FT,
};
use crate::physics::PerformanceModel;

// ---------------------------------------------------------------------------
// FMS speed schedule
// ---------------------------------------------------------------------------

/// Altitude-banded speed targets for FMS speed mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSchedule {
    pub initial_climb_kt: f64,
    pub cruise_kt: f64,
    pub cruise_mach: f64,
}

impl Default for SpeedSchedule {
    fn default() -> Self {
        Self { initial_climb_kt: 180.0, cruise_kt: 290.0, cruise_mach: 0.78 }
    }
}

impl SpeedSchedule {
    pub fn for_type(data: &PerformanceData) -> Self {
        Self {
            initial_climb_kt: data.initial_climb_speed_kt,
            cruise_kt: data.cruise_speed_kt,
            cruise_mach: data.cruise_mach,
        }
    }

    /// Unconstrained speed for an altitude band.
    pub fn banded(&self, perf: &PerformanceModel, altitude: f64) -> f64 {
        if altitude < INITIAL_CLIMB_ALTITUDE_FT {
            self.initial_climb_kt
        } else if altitude < SPEED_LIMIT_ALTITUDE_FT {
            self.cruise_kt.min(BELOW_FL100_SPEED_LIMIT_KT)
        } else if altitude < MACH_TRANSITION_ALTITUDE_FT {
            self.cruise_kt
        } else {
            perf.mach_to_tas(self.cruise_mach, altitude)
        }
    }

    /// Scheduled target speed after route limits; each present limit only lowers it.
    pub fn target(&self, perf: &PerformanceModel, altitude: f64, limits: &[Option<f64>]) -> f64 {
        let mut speed = self.banded(perf, altitude);
        for limit in limits.iter().flatten() {
            speed = speed.min(*limit);
        }
        let ceiling = perf.max_operating_tas(altitude);
        if ceiling > 0.0 {
            speed = speed.min(ceiling);
        }
        speed.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::types::presets;

    fn setup() -> (SpeedSchedule, PerformanceModel) {
        let data = presets::a320();
        (SpeedSchedule::for_type(&data), PerformanceModel::new(data))
    }

    #[test]
    fn bands_follow_altitude() {
        let (sched, perf) = setup();
        assert_eq!(sched.target(&perf, 1_500.0, &[]), sched.initial_climb_kt);
        assert_eq!(sched.target(&perf, 8_000.0, &[]), 250.0);
        assert_eq!(sched.target(&perf, 18_000.0, &[]), sched.cruise_kt);
        let high = sched.target(&perf, 35_000.0, &[]);
        let mach = perf.tas_to_mach(high, 35_000.0);
        assert!(mach <= sched.cruise_mach + 1e-9, "mach {}", mach);
        assert!(high > 400.0);
    }

    #[test]
    fn limits_clamp_downward_only() {
        let (sched, perf) = setup();
        assert_eq!(sched.target(&perf, 8_000.0, &[Some(210.0), None]), 210.0);
        assert_eq!(sched.target(&perf, 8_000.0, &[None, Some(220.0)]), 220.0);
        assert_eq!(sched.target(&perf, 8_000.0, &[Some(300.0), Some(280.0), None]), 250.0);
        assert_eq!(sched.target(&perf, 8_000.0, &[Some(300.0), Some(230.0), Some(240.0)]), 230.0);
    }
}
