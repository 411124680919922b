use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Unknown aircraft: {0}")]
    UnknownAircraft(String),

    #[error("Unknown waypoint: {0}")]
    UnknownWaypoint(String),

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Unknown runway: {0}")]
    UnknownRunway(String),

    #[error("Duplicate callsign: {0}")]
    DuplicateCallsign(String),

    #[error("Clearance rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

macro_rules! rejected {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::error::SimError::Rejected( format!( $fmt $(, $arg)* ))
    };
}
pub(crate) use rejected;
