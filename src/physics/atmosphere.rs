use super::units::{FT_TO_M, G0, KT_TO_MS};

// ---------------------------------------------------------------------------
// ISA standard atmosphere (troposphere + lower stratosphere), feet based
// ---------------------------------------------------------------------------

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg·K)
const GAMMA: f64 = 1.4;        // ratio of specific heats

pub const T0: f64 = 288.15;    // sea-level temperature, K
pub const P0: f64 = 101_325.0; // sea-level pressure, Pa
pub const RHO0: f64 = 1.225;   // sea-level density, kg/m^3

/// Geopotential altitude of the tropopause, ft.
pub const TROPOPAUSE_FT: f64 = 36_089.0;

/// Temperature lapse normalised by T0, per ft (0.0019812 K/ft / 288.15 K).
const THETA_LAPSE_PER_FT: f64 = 6.875_6e-6;

/// Pressure and density exponents of the troposphere polynomial.
const PRESSURE_EXP: f64 = 5.255_9;
const DENSITY_EXP: f64 = 4.255_9;

/// Atmospheric properties at a given pressure altitude.
#[derive(Debug, Clone, Copy)]
pub struct Atmo {
    pub density: f64,        // kg/m^3
    pub pressure: f64,       // Pa
    pub temperature: f64,    // K
    pub sound_speed_kt: f64, // kt
}

/// ISA model up to the lower stratosphere.
///
/// Polynomial troposphere below 36,089 ft, isothermal exponential decay above.
/// Negative altitudes clamp to sea level.
pub fn isa(altitude_ft: f64) -> Atmo {
    let h = altitude_ft.max(0.0);

    let (temperature, pressure, density) = if h < TROPOPAUSE_FT {
        troposphere(h)
    } else {
        stratosphere(h)
    };

    Atmo {
        density,
        pressure,
        temperature,
        sound_speed_kt: sound_speed_kt(temperature),
    }
}

/// Local speed of sound in knots; zero for a degenerate temperature.
pub fn sound_speed_kt(temperature: f64) -> f64 {
    if temperature > 0.0 {
        (GAMMA * R_AIR * temperature).sqrt() / KT_TO_MS
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Layer helpers
// ---------------------------------------------------------------------------

fn troposphere(h: f64) -> (f64, f64, f64) {
    let theta = (1.0 - THETA_LAPSE_PER_FT * h).max(0.0);
    (T0 * theta, P0 * theta.powf(PRESSURE_EXP), RHO0 * theta.powf(DENSITY_EXP))
}

fn stratosphere(h: f64) -> (f64, f64, f64) {
    let (t, p_base, rho_base) = troposphere(TROPOPAUSE_FT);
    let scale_height_m = R_AIR * t / G0;
    let decay = (-(h - TROPOPAUSE_FT) * FT_TO_M / scale_height_m).exp();
    (t, p_base * decay, rho_base * decay)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_standard_values() {
        let a = isa(0.0);
        assert!((a.temperature - 288.15).abs() < 0.01);
        assert!((a.pressure - 101_325.0).abs() < 1.0);
        assert!((a.density - 1.225).abs() < 0.001);
        assert!((a.sound_speed_kt - 661.5).abs() < 0.5);
    }

    #[test]
    fn tropopause_is_continuous() {
        let below = isa(TROPOPAUSE_FT - 0.01);
        let above = isa(TROPOPAUSE_FT);
        assert!((below.temperature - 216.65).abs() < 0.1);
        assert!((below.density - above.density).abs() < 1e-4);
        assert!((below.pressure - above.pressure).abs() < 1.0);
    }

    #[test]
    fn density_monotonically_decreases() {
        let mut prev = isa(0.0).density;
        for h in (1_000..=45_000).step_by(1_000) {
            let rho = isa(h as f64).density;
            assert!(rho < prev, "density should drop at {} ft", h);
            assert!(rho > 0.0);
            prev = rho;
        }
    }

    #[test]
    fn negative_altitude_clamps_to_sea_level() {
        let a = isa(-500.0);
        assert!((a.temperature - 288.15).abs() < 0.01);
    }

    #[test]
    fn degenerate_temperature_has_no_sound_speed() {
        assert_eq!(sound_speed_kt(0.0), 0.0);
        assert_eq!(sound_speed_kt(-10.0), 0.0);
    }
}
