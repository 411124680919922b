pub mod types;
pub mod state;
pub mod kinematics;
pub mod builder;

pub use builder::AircraftBuilder;
pub use state::{AircraftState, Airframe, FlightState, Ownership};
pub use types::{presets, PerformanceData, WakeCategory};
