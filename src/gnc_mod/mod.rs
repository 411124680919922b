pub mod controller;
pub mod pid;
pub mod modes;
pub mod constraints;
pub mod schedule;
pub mod autopilot;

pub use autopilot::{ApproachEvent, Autopilot, AutopilotDefaults, Mcp};
pub use constraints::propagate;
pub use controller::{AircraftControl, ControlCommand, ControlLimits};
pub use modes::{FlightPhase, LateralMode, SpeedMode, VerticalMode};
pub use pid::Pid;
pub use schedule::SpeedSchedule;
