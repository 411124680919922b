use crate::route::{FlightLeg, ResolvedLeg};

/// Annotate each leg with the altitude/speed it should be flown at.
///
/// Walks the plan from its last leg back to the first, starting from the
/// end-of-plan targets. Speed limits only ever lower the running speed;
/// altitude constraints fold in by kind (`At` overrides, `Above` raises,
/// `Below` caps). Unconstrained legs inherit whatever later legs require,
/// so a downstream restriction is honoured before the aircraft reaches it.
pub fn propagate(legs: &[FlightLeg], end_altitude: f64, end_speed: f64) -> Vec<ResolvedLeg> {
    let mut altitude = end_altitude;
    let mut speed = end_speed;
    let mut resolved: Vec<ResolvedLeg> = legs
        .iter()
        .rev()
        .map(|leg| {
            if let Some(limit) = leg.speed_limit() {
                speed = speed.min(limit);
            }
            if let Some(constraint) = leg.altitude_constraint() {
                altitude = constraint.bound(altitude);
            }
            ResolvedLeg { leg: leg.clone(), altitude_target: altitude, speed_target: speed }
        })
        .collect();
    resolved.reverse();
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::AltitudeConstraint;

    fn targets(resolved: &[ResolvedLeg]) -> Vec<f64> {
        resolved.iter().map(|l| l.altitude_target).collect()
    }

    #[test]
    fn step_down_lookahead() {
        let legs = vec![
            FlightLeg::track_to("A"),
            FlightLeg::track_to("B").with_altitude(AltitudeConstraint::at(8_000.0)),
        ];
        let resolved = propagate(&legs, 2_000.0, 250.0);
        assert_eq!(targets(&resolved), vec![8_000.0, 8_000.0]);
    }

    #[test]
    fn above_never_lowers_downstream_target() {
        let legs = vec![
            FlightLeg::track_to("A").with_altitude(AltitudeConstraint::above(6_000.0)),
            FlightLeg::track_to("B"),
        ];
        let high = propagate(&legs, 30_000.0, 290.0);
        assert_eq!(targets(&high), vec![30_000.0, 30_000.0]);
        let low = propagate(&legs, 3_000.0, 290.0);
        assert_eq!(targets(&low), vec![6_000.0, 3_000.0]);
    }

    #[test]
    fn below_and_at_cap_target() {
        let legs = vec![
            FlightLeg::track_to("A").with_altitude(AltitudeConstraint::below(11_000.0)),
            FlightLeg::track_to("B").with_altitude(AltitudeConstraint::at(15_000.0)),
            FlightLeg::track_to("C"),
        ];
        let resolved = propagate(&legs, 30_000.0, 290.0);
        assert_eq!(targets(&resolved), vec![11_000.0, 15_000.0, 30_000.0]);
    }

    #[test]
    fn va_below_resolves_to_constraint() {
        let legs = vec![FlightLeg::vector_to_altitude(90.0, AltitudeConstraint::below(700.0))];
        let resolved = propagate(&legs, 30_000.0, 290.0);
        assert_eq!(targets(&resolved), vec![700.0]);
    }

    #[test]
    fn speed_limits_propagate_backward() {
        let legs = vec![
            FlightLeg::track_to("A"),
            FlightLeg::track_to("B").with_speed_limit(250.0),
            FlightLeg::track_to("C").with_speed_limit(210.0),
            FlightLeg::track_to("D"),
        ];
        let speeds: Vec<f64> = propagate(&legs, 280.0, 280.0).iter().map(|l| l.speed_target).collect();
        assert_eq!(speeds, vec![210.0, 210.0, 210.0, 280.0]);
    }

    #[test]
    fn empty_plan_resolves_to_nothing() {
        assert!(propagate(&[], 10_000.0, 250.0).is_empty());
    }
}
