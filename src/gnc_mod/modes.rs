use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Autopilot modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LateralMode {
    #[default]
    Hdg,
    Lnav,
    Loc,
    Rollout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalMode {
    #[default]
    Alt,
    Flch,
    Vnav,
    VnavAlt,
    Gs,
    Flare,
}

impl VerticalMode {
    /// Modes that may override the PID with the fixed climb/descent rate.
    pub fn is_level_change(self) -> bool {
        matches!(self, VerticalMode::Flch | VerticalMode::Vnav)
    }

    /// Glidepath modes that no MCP altitude may interrupt.
    pub fn is_glidepath(self) -> bool {
        matches!(self, VerticalMode::Gs | VerticalMode::Flare)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedMode {
    #[default]
    Manual,
    Fms,
}

/// Phase a flight plan is flown in; selects the MCP defaults seeded on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    Climb,
    Descent,
    Approach,
}

impl fmt::Display for LateralMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LateralMode::Hdg => "HDG",
            LateralMode::Lnav => "LNAV",
            LateralMode::Loc => "LOC",
            LateralMode::Rollout => "ROLLOUT",
        })
    }
}

impl fmt::Display for VerticalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerticalMode::Alt => "ALT",
            VerticalMode::Flch => "FLCH",
            VerticalMode::Vnav => "VNAV",
            VerticalMode::VnavAlt => "VNAV ALT",
            VerticalMode::Gs => "G/S",
            VerticalMode::Flare => "FLARE",
        })
    }
}

impl fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpeedMode::Manual => "SPD",
            SpeedMode::Fms => "FMS SPD",
        })
    }
}
