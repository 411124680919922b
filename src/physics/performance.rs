use serde::{Deserialize, Serialize};

use crate::aircraft::types::PerformanceData;
use super::aerodynamics::{drag_coefficient, dynamic_pressure, lift_coefficient};
use super::atmosphere::{self, P0, RHO0, TROPOPAUSE_FT};
use super::units::{finite_or_zero, G0, KT_TO_MS, MS_TO_FPM};

// ---------------------------------------------------------------------------
// Model constants
// ---------------------------------------------------------------------------

/// Fraction of maximum thrust available in the climb rating.
pub const CLIMB_THRUST_DERATE: f64 = 0.9;

/// Thrust lapse exponent on the density ratio.
pub const THRUST_LAPSE_EXPONENT: f64 = 1.0;

/// Energy-share factor for constant-CAS climbs in the troposphere.
pub const TROPOSPHERE_ACCEL_FACTOR: f64 = 0.82;

/// Energy-share factor for constant-Mach climbs in the stratosphere.
pub const STRATOSPHERE_ACCEL_FACTOR: f64 = 0.95;

/// Band above the tropopause across which the factor blends between the two values.
pub const ACCEL_FACTOR_BLEND_FT: f64 = 5_000.0;

/// Below this dynamic pressure (Pa) drag is not meaningful.
const MIN_DYNAMIC_PRESSURE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Aerodynamic configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AeroConfig {
    #[default]
    Clean,
    Approach, // flaps
    Landing,  // flaps + gear
}

impl AeroConfig {
    pub fn cd0_penalty(self) -> f64 {
        match self {
            AeroConfig::Clean => 0.0,
            AeroConfig::Approach => 0.020,
            AeroConfig::Landing => 0.035,
        }
    }
}

// ---------------------------------------------------------------------------
// Performance model
// ---------------------------------------------------------------------------

/// Analytic point-mass performance of one aircraft type.
///
/// Altitudes are pressure altitudes in ft, speeds in kt, masses in kg.
/// Every function returns a finite value; degenerate inputs produce 0.
#[derive(Debug, Clone)]
pub struct PerformanceModel {
    data: PerformanceData,
}

impl PerformanceModel {
    pub fn new(data: PerformanceData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &PerformanceData {
        &self.data
    }

    pub fn density(&self, altitude_ft: f64) -> f64 {
        atmosphere::isa(altitude_ft).density
    }

    pub fn temperature(&self, altitude_ft: f64) -> f64 {
        atmosphere::isa(altitude_ft).temperature
    }

    pub fn pressure(&self, altitude_ft: f64) -> f64 {
        atmosphere::isa(altitude_ft).pressure
    }

    pub fn speed_of_sound(&self, altitude_ft: f64) -> f64 {
        atmosphere::isa(altitude_ft).sound_speed_kt
    }

    /// Total drag in newtons.
    pub fn drag(&self, tas_kt: f64, altitude_ft: f64, mass_kg: f64, config: AeroConfig) -> f64 {
        let v = tas_kt.max(0.0) * KT_TO_MS;
        let q = dynamic_pressure(self.density(altitude_ft), v);
        if q < MIN_DYNAMIC_PRESSURE {
            return 0.0;
        }
        let s = self.data.wing_area_m2;
        let cl = lift_coefficient(mass_kg.max(0.0) * G0, q, s);
        let cd = drag_coefficient(self.data.cd0 + config.cd0_penalty(), self.data.induced_drag_k, cl);
        finite_or_zero(q * s * cd)
    }

    /// Climb-rated thrust available at altitude, newtons.
    pub fn max_thrust(&self, altitude_ft: f64) -> f64 {
        let sigma = self.density(altitude_ft) / RHO0;
        finite_or_zero(
            self.data.total_sea_level_thrust()
                * sigma.powf(THRUST_LAPSE_EXPONENT)
                * CLIMB_THRUST_DERATE,
        )
    }

    /// Share of excess power that goes into height rather than speed.
    pub fn acceleration_factor(&self, altitude_ft: f64) -> f64 {
        let above = altitude_ft - TROPOPAUSE_FT;
        if above <= 0.0 {
            TROPOSPHERE_ACCEL_FACTOR
        } else if above >= ACCEL_FACTOR_BLEND_FT {
            STRATOSPHERE_ACCEL_FACTOR
        } else {
            let frac = above / ACCEL_FACTOR_BLEND_FT;
            TROPOSPHERE_ACCEL_FACTOR + frac * (STRATOSPHERE_ACCEL_FACTOR - TROPOSPHERE_ACCEL_FACTOR)
        }
    }

    /// Maximum sustained climb rate in ft/min; negative when thrust cannot
    /// balance drag.
    pub fn max_climb_rate(&self, tas_kt: f64, altitude_ft: f64, mass_kg: f64) -> f64 {
        let weight = mass_kg * G0;
        if weight <= 0.0 {
            return 0.0;
        }
        let v = tas_kt.max(0.0) * KT_TO_MS;
        let excess = self.max_thrust(altitude_ft) - self.drag(tas_kt, altitude_ft, mass_kg, AeroConfig::Clean);
        let unaccelerated = excess * v / weight; // m/s
        finite_or_zero(unaccelerated * self.acceleration_factor(altitude_ft) * MS_TO_FPM)
    }

    pub fn tas_to_mach(&self, tas_kt: f64, altitude_ft: f64) -> f64 {
        let a = self.speed_of_sound(altitude_ft);
        if a <= 0.0 {
            return 0.0;
        }
        finite_or_zero(tas_kt.max(0.0) / a)
    }

    pub fn mach_to_tas(&self, mach: f64, altitude_ft: f64) -> f64 {
        finite_or_zero(mach.max(0.0) * self.speed_of_sound(altitude_ft))
    }

    /// Compressible TAS → CAS via impact pressure.
    pub fn tas_to_cas(&self, tas_kt: f64, altitude_ft: f64) -> f64 {
        let atm = atmosphere::isa(altitude_ft);
        let a0 = self.speed_of_sound(0.0);
        if atm.sound_speed_kt <= 0.0 || atm.pressure <= 0.0 || a0 <= 0.0 {
            return 0.0;
        }
        let mach = tas_kt.max(0.0) / atm.sound_speed_kt;
        let qc = atm.pressure * ((1.0 + 0.2 * mach * mach).powf(3.5) - 1.0);
        let cas = a0 * (5.0 * ((qc / P0 + 1.0).powf(2.0 / 7.0) - 1.0)).max(0.0).sqrt();
        finite_or_zero(cas)
    }

    /// Compressible CAS → TAS via impact pressure.
    pub fn cas_to_tas(&self, cas_kt: f64, altitude_ft: f64) -> f64 {
        let atm = atmosphere::isa(altitude_ft);
        let a0 = self.speed_of_sound(0.0);
        if atm.sound_speed_kt <= 0.0 || atm.pressure <= 0.0 || a0 <= 0.0 {
            return 0.0;
        }
        let ratio = cas_kt.max(0.0) / a0;
        let qc = P0 * ((1.0 + 0.2 * ratio * ratio).powf(3.5) - 1.0);
        let mach = (5.0 * ((qc / atm.pressure + 1.0).powf(2.0 / 7.0) - 1.0)).max(0.0).sqrt();
        finite_or_zero(mach * atm.sound_speed_kt)
    }

    /// Highest TAS allowed by Vmo/Mmo at this altitude.
    pub fn max_operating_tas(&self, altitude_ft: f64) -> f64 {
        let vmo = self.cas_to_tas(self.data.vmo_kt, altitude_ft);
        let mmo = self.mach_to_tas(self.data.mmo, altitude_ft);
        vmo.min(mmo)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::types::presets;
    use approx::assert_abs_diff_eq;

    fn b738() -> PerformanceModel {
        PerformanceModel::new(presets::b738())
    }

    #[test]
    fn climb_rate_strictly_decreases_with_altitude() {
        for data in presets::all() {
            let model = PerformanceModel::new(data.clone());
            let mass = data.arrival_mass();
            let mut prev = f64::INFINITY;
            let mut h = 0.0;
            while h <= data.ceiling_ft {
                let rate = model.max_climb_rate(280.0, h, mass);
                assert!(rate < prev, "{}: climb rate rose at {} ft", data.type_id, h);
                prev = rate;
                h += 1_000.0;
            }
        }
    }

    #[test]
    fn climb_rate_is_plausible_at_sea_level() {
        let m = b738();
        let rate = m.max_climb_rate(250.0, 0.0, 65_000.0);
        assert!(rate > 2_000.0 && rate < 8_000.0, "got {:.0} fpm", rate);
    }

    #[test]
    fn zero_speed_means_no_drag_and_no_climb() {
        let m = b738();
        assert_eq!(m.drag(0.0, 5_000.0, 65_000.0, AeroConfig::Clean), 0.0);
        assert_eq!(m.max_climb_rate(0.0, 5_000.0, 65_000.0), 0.0);
        assert_eq!(m.max_climb_rate(250.0, 5_000.0, 0.0), 0.0);
    }

    #[test]
    fn configuration_adds_drag() {
        let m = b738();
        let clean = m.drag(160.0, 2_000.0, 60_000.0, AeroConfig::Clean);
        let flaps = m.drag(160.0, 2_000.0, 60_000.0, AeroConfig::Approach);
        let gear = m.drag(160.0, 2_000.0, 60_000.0, AeroConfig::Landing);
        assert!(clean < flaps && flaps < gear);
    }

    #[test]
    fn thrust_lapses_with_density() {
        let m = b738();
        let sl = m.max_thrust(0.0);
        assert_abs_diff_eq!(sl, 2.0 * 121_400.0 * CLIMB_THRUST_DERATE, epsilon = 1.0);
        assert!(m.max_thrust(30_000.0) < 0.5 * sl);
    }

    #[test]
    fn cas_equals_tas_at_sea_level() {
        let m = b738();
        assert_abs_diff_eq!(m.tas_to_cas(250.0, 0.0), 250.0, epsilon = 0.5);
        assert_abs_diff_eq!(m.cas_to_tas(250.0, 0.0), 250.0, epsilon = 0.5);
    }

    #[test]
    fn cas_tas_conversion_inverts() {
        let m = b738();
        let tas = m.cas_to_tas(280.0, 30_000.0);
        assert!(tas > 420.0 && tas < 500.0, "got {:.1}", tas);
        assert_abs_diff_eq!(m.tas_to_cas(tas, 30_000.0), 280.0, epsilon = 0.5);
    }

    #[test]
    fn mach_conversion_uses_local_sound_speed() {
        let m = b738();
        let tas = m.mach_to_tas(0.78, 37_000.0);
        assert_abs_diff_eq!(tas, 0.78 * 573.6, epsilon = 2.0);
        assert_abs_diff_eq!(m.tas_to_mach(tas, 37_000.0), 0.78, epsilon = 1e-9);
    }

    #[test]
    fn max_operating_speed_switches_to_mach_limit() {
        let m = b738();
        let low = m.max_operating_tas(5_000.0);
        assert_abs_diff_eq!(low, m.cas_to_tas(340.0, 5_000.0), epsilon = 1e-9);
        let high = m.max_operating_tas(39_000.0);
        assert_abs_diff_eq!(high, m.mach_to_tas(0.82, 39_000.0), epsilon = 1e-9);
    }

    #[test]
    fn every_function_is_finite_over_the_envelope() {
        let m = b738();
        for h in (0..=45_000).step_by(500) {
            let h = h as f64;
            for v in (0..=600).step_by(10) {
                let v = v as f64;
                for value in [
                    m.drag(v, h, 65_000.0, AeroConfig::Landing),
                    m.max_climb_rate(v, h, 65_000.0),
                    m.tas_to_cas(v, h),
                    m.cas_to_tas(v, h),
                    m.tas_to_mach(v, h),
                ] {
                    assert!(value.is_finite(), "non-finite at h={} v={}", h, v);
                }
            }
            assert!(m.max_thrust(h).is_finite());
            assert!(m.speed_of_sound(h) > 0.0);
        }
    }
}
