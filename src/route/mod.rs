pub mod geometry;
pub mod leg;
pub mod waypoint;
pub mod plan;
pub mod airport;

pub use airport::{Airport, Approach, GeoTransform, Procedure, StaticAirport};
pub use leg::{AltitudeConstraint, ConstraintKind, FlightLeg};
pub use plan::{FlightPlan, ResolvedLeg};
pub use waypoint::{IlsLimits, Runway, Waypoint};
