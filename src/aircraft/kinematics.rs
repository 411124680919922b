use tracing::info;

use crate::physics::units::finite_or_zero;
use crate::route::geometry::{heading_difference, heading_vector, normalize_heading};
use super::state::{Airframe, FlightState};

/// Share of the climb rate kept while also accelerating to a higher speed.
pub const ACCELERATING_CLIMB_DERATE: f64 = 0.5;

/// Speed deficit below which the aircraft counts as not accelerating, kt.
const ACCELERATION_DEADBAND_KT: f64 = 0.5;

// ---------------------------------------------------------------------------
// Single-axis integration steps (snap on overshoot)
// ---------------------------------------------------------------------------

/// Turn from `current` toward `target` along the shorter direction.
pub fn step_heading(current: f64, target: f64, turn_rate_dps: f64, dt: f64) -> f64 {
    let delta = heading_difference(current, target);
    let step = turn_rate_dps.max(0.0) * dt;
    if delta.abs() <= step {
        normalize_heading(target)
    } else {
        normalize_heading(current + step.copysign(delta))
    }
}

/// Move toward `target` by at most `max_step`.
pub fn step_toward(current: f64, target: f64, max_step: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= max_step.max(0.0) {
        target
    } else {
        current + max_step.max(0.0).copysign(delta)
    }
}

// ---------------------------------------------------------------------------
// Airframe integration
// ---------------------------------------------------------------------------

impl Airframe {
    /// Climb rate available right now, ft/min, never negative.
    pub fn available_climb_rate(&self) -> f64 {
        let airframe_max = self.limits.max_climb_fps * 60.0;
        let performance = self
            .performance
            .max_climb_rate(self.speed, self.altitude, self.mass)
            .clamp(0.0, airframe_max.max(0.0));
        if self.command.target_speed > self.speed + ACCELERATION_DEADBAND_KT {
            performance * ACCELERATING_CLIMB_DERATE
        } else {
            performance
        }
    }

    /// Advance heading, altitude, speed and position by one step.
    pub fn integrate(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let cmd = self.command;

        self.heading = step_heading(self.heading, cmd.target_heading, self.limits.turn_rate_dps, dt);
        self.bank = if self.heading == normalize_heading(cmd.target_heading) { 0.0 } else { cmd.bank_deg };

        // Symmetric: descents are bounded by the same performance limit as climbs.
        let rate_fpm = cmd.vertical_speed_fpm.abs().min(self.available_climb_rate());
        let previous_altitude = self.altitude;
        self.altitude = step_toward(self.altitude, cmd.target_altitude, rate_fpm / 60.0 * dt);
        self.vertical_speed = finite_or_zero((self.altitude - previous_altitude) / dt * 60.0);

        self.speed = step_toward(self.speed, cmd.target_speed, self.limits.acceleration_kts * dt);
        self.advance_position(dt);
    }

    /// Ground roll: accelerate along the runway heading until rotation speed.
    pub fn takeoff_roll(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let rotation = self.performance.data().rotation_speed_kt;
        self.speed = step_toward(self.speed, rotation, self.limits.acceleration_kts * dt);
        self.advance_position(dt);
        if self.speed >= rotation {
            self.flight_state = FlightState::Flying;
            info!(speed = self.speed.round(), "rotate, airborne");
        }
    }

    fn advance_position(&mut self, dt: f64) {
        let distance = self.speed / 3600.0 * dt;
        self.position += heading_vector(self.heading) * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector2;

    use crate::aircraft::builder::AircraftBuilder;
    use crate::aircraft::types::presets;
    use crate::gnc::ControlCommand;

    fn airframe(altitude: f64, heading: f64, speed: f64) -> Airframe {
        AircraftBuilder::new("TST1", presets::a320())
            .altitude(altitude)
            .heading(heading)
            .speed(speed)
            .build()
            .airframe
    }

    #[test]
    fn turns_take_the_short_way() {
        for from in (0..360).step_by(15) {
            for to in (0..360).step_by(20) {
                let next = step_heading(from as f64, to as f64, 3.0, 1.0);
                let before = heading_difference(from as f64, to as f64).abs();
                let after = heading_difference(next, to as f64).abs();
                assert!(after <= before, "{} -> {} moved away", from, to);
                assert!(heading_difference(from as f64, next).abs() <= 3.0 + 1e-9);
            }
        }
        assert_abs_diff_eq!(step_heading(355.0, 10.0, 3.0, 1.0), 358.0);
        assert_abs_diff_eq!(step_heading(5.0, 350.0, 3.0, 1.0), 2.0);
    }

    #[test]
    fn heading_snaps_inside_one_step() {
        assert_eq!(step_heading(359.0, 1.0, 3.0, 1.0), 1.0);
        assert_eq!(step_heading(90.0, 90.5, 3.0, 1.0), 90.5);
    }

    #[test]
    fn step_toward_never_overshoots() {
        assert_eq!(step_toward(100.0, 105.0, 10.0), 105.0);
        assert_eq!(step_toward(100.0, 80.0, 5.0), 95.0);
        assert_eq!(step_toward(100.0, 80.0, -5.0), 100.0);
    }

    #[test]
    fn position_integrates_clockwise_from_north() {
        let mut af = airframe(5_000.0, 90.0, 360.0);
        af.command = ControlCommand {
            target_heading: 90.0,
            target_altitude: 5_000.0,
            target_speed: 360.0,
            ..Default::default()
        };
        af.integrate(10.0);
        assert_abs_diff_eq!(af.position.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(af.position.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn altitude_and_speed_snap_on_overshoot() {
        let mut af = airframe(5_000.0, 0.0, 250.0);
        af.command = ControlCommand {
            target_heading: 0.0,
            target_altitude: 4_990.0,
            target_speed: 251.0,
            vertical_speed_fpm: -6_000.0,
            bank_deg: 0.0,
        };
        af.integrate(1.0);
        assert_eq!(af.altitude, 4_990.0);
        assert_eq!(af.speed, 251.0);
    }

    #[test]
    fn climb_is_bounded_by_performance() {
        let mut af = airframe(5_000.0, 0.0, 250.0);
        af.command = ControlCommand {
            target_heading: 0.0,
            target_altitude: 30_000.0,
            target_speed: 250.0,
            vertical_speed_fpm: 6_000.0,
            bank_deg: 0.0,
        };
        let limit = af.available_climb_rate();
        af.integrate(1.0);
        assert!(af.vertical_speed <= limit + 1e-6);
        assert!(af.vertical_speed > 0.0);

        let mut accelerating = airframe(5_000.0, 0.0, 250.0);
        accelerating.command = ControlCommand { target_speed: 300.0, ..af.command };
        assert_abs_diff_eq!(
            accelerating.available_climb_rate(),
            limit * ACCELERATING_CLIMB_DERATE,
            epsilon = 1e-9
        );
    }

    #[test]
    fn descent_is_bounded_by_performance() {
        let mut af = airframe(38_000.0, 0.0, 250.0);
        af.command = ControlCommand {
            target_heading: 0.0,
            target_altitude: 20_000.0,
            target_speed: 250.0,
            vertical_speed_fpm: -6_000.0,
            bank_deg: 0.0,
        };
        let limit = af.available_climb_rate();
        assert!(limit < 1_000.0, "limit {:.0} fpm", limit);
        af.integrate(1.0);
        assert!(af.vertical_speed < 0.0 || limit == 0.0);
        assert!(af.vertical_speed >= -limit - 1e-6, "descended at {:.0} fpm", af.vertical_speed);
    }

    #[test]
    fn takeoff_roll_rotates_at_vr() {
        let mut af = airframe(20.0, 360.0, 0.0);
        af.flight_state = FlightState::Takeoff;
        af.position = Vector2::new(0.0, -1.0);
        let mut t = 0.0;
        while af.flight_state == FlightState::Takeoff && t < 300.0 {
            af.takeoff_roll(1.0);
            t += 1.0;
        }
        assert_eq!(af.flight_state, FlightState::Flying);
        assert!(af.position.y > -1.0);
        assert_eq!(af.altitude, 20.0);
    }
}
