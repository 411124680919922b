pub mod config;
pub mod event;
pub mod separation;
pub mod command;
pub mod runner;

pub use command::{prepare, Command, CommandOutcome, PendingUpdate};
pub use config::{SeparationConfig, SimConfig, WakeMinimum};
pub use event::{default_detectors, AircraftSnapshot, EventDetector, EventKind, SimEvent};
pub use runner::{Simulation, TickReport};
pub use separation::{
    PairKey, PairSeparation, SeparationContext, SeparationDetector, SeparationEvent, SeparationReport,
    SeparationStatus,
};
