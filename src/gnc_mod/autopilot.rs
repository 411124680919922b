use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aircraft::state::FlightState;
use crate::consts::{
    ALTITUDE_CAPTURE_TOLERANCE_FT, FLCH_OVERRIDE_THRESHOLD_FT, FLCH_OVERRIDE_VS_FPM,
    ILS_APPROACH_SPEED_KT,
};
use crate::error::{rejected, Result};
use crate::route::geometry::{heading_difference, normalize_heading};
use crate::route::{Airport, FlightLeg, FlightPlan, IlsLimits, Runway};
use super::constraints::propagate;
use super::controller::{AircraftControl, ControlCommand};
use super::modes::{FlightPhase, LateralMode, SpeedMode, VerticalMode};
use super::pid::Pid;
use super::schedule::SpeedSchedule;

/// Smallest vertical speed commanded while an altitude error remains, ft/min.
const MIN_CAPTURE_VS_FPM: f64 = 500.0;

/// Altitude error below which the target counts as held exactly, ft.
const ALTITUDE_DEADBAND_FT: f64 = 1.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// MCP values seeded on plan activation and landing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotDefaults {
    pub cruise_altitude_ft: f64,
    pub approach_altitude_ft: f64,
    pub approach_speed_kt: f64,
    pub missed_approach_altitude_ft: f64,
    pub touchdown_distance_nm: f64,
    pub touchdown_height_ft: f64,
    pub ils: IlsLimits,
}

impl Default for AutopilotDefaults {
    fn default() -> Self {
        Self {
            cruise_altitude_ft: 30_000.0,
            approach_altitude_ft: 3_000.0,
            approach_speed_kt: 210.0,
            missed_approach_altitude_ft: 3_000.0,
            touchdown_distance_nm: 0.5,
            touchdown_height_ft: 300.0,
            ils: IlsLimits::default(),
        }
    }
}

/// Pilot-selected targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mcp {
    pub heading: f64,
    pub altitude: f64,
    pub speed: f64,
}

/// Landing-sequence transitions reported by [`Autopilot::manage_approach`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApproachEvent {
    Captured { runway: String },
    Touchdown { runway: String },
    GoAround { runway: String },
}

// ---------------------------------------------------------------------------
// Autopilot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Autopilot {
    lateral: LateralMode,
    vertical: VerticalMode,
    speed_mode: SpeedMode,
    mcp: Mcp,
    plan: FlightPlan,
    phase: Option<FlightPhase>,
    bank_pid: Pid,
    vs_pid: Pid,
    captured_runway: Option<Runway>,
    armed_runway: Option<String>,
    schedule: SpeedSchedule,
    defaults: AutopilotDefaults,
    last_command: ControlCommand,
    logged_modes: (LateralMode, VerticalMode, SpeedMode),
}

impl Autopilot {
    /// Wings level, holding the current altitude and speed.
    pub fn new(heading: f64, altitude: f64, speed: f64) -> Self {
        Self {
            lateral: LateralMode::Hdg,
            vertical: VerticalMode::Alt,
            speed_mode: SpeedMode::Manual,
            mcp: Mcp { heading: normalize_heading(heading), altitude, speed },
            plan: FlightPlan::default(),
            phase: None,
            bank_pid: Pid::new(1.5, 0.02, 0.2).with_limits(-30.0, 30.0),
            vs_pid: Pid::new(6.0, 0.01, 0.0).with_limits(-FLCH_OVERRIDE_VS_FPM, FLCH_OVERRIDE_VS_FPM),
            captured_runway: None,
            armed_runway: None,
            schedule: SpeedSchedule::default(),
            defaults: AutopilotDefaults::default(),
            last_command: ControlCommand {
                target_heading: normalize_heading(heading),
                target_altitude: altitude,
                target_speed: speed,
                ..Default::default()
            },
            logged_modes: (LateralMode::Hdg, VerticalMode::Alt, SpeedMode::Manual),
        }
    }

    pub fn with_schedule(mut self, schedule: SpeedSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_defaults(mut self, defaults: AutopilotDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn lateral_mode(&self) -> LateralMode {
        self.lateral
    }

    pub fn vertical_mode(&self) -> VerticalMode {
        self.vertical
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn mcp(&self) -> &Mcp {
        &self.mcp
    }

    pub fn plan(&self) -> &FlightPlan {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut FlightPlan {
        &mut self.plan
    }

    pub fn phase(&self) -> Option<FlightPhase> {
        self.phase
    }

    pub fn captured_runway(&self) -> Option<&Runway> {
        self.captured_runway.as_ref()
    }

    pub fn armed_runway(&self) -> Option<&str> {
        self.armed_runway.as_deref()
    }

    pub fn schedule(&self) -> &SpeedSchedule {
        &self.schedule
    }

    /// Command produced by the most recent update.
    pub fn last_command(&self) -> &ControlCommand {
        &self.last_command
    }

    // -- MCP inputs ---------------------------------------------------------

    pub fn set_heading(&mut self, heading: f64) {
        self.lateral = LateralMode::Hdg;
        self.plan.clear();
        self.armed_runway = None;
        self.mcp.heading = normalize_heading(heading);
    }

    /// Select a new altitude. Level change unless already within capture tolerance.
    pub fn set_altitude(&mut self, altitude: f64, current_altitude: f64) -> Result<()> {
        if self.vertical.is_glidepath() {
            return Err(rejected!("established on the glidepath, cannot change altitude to {:.0}", altitude));
        }
        self.mcp.altitude = altitude;
        self.vertical = if (altitude - current_altitude).abs() <= ALTITUDE_CAPTURE_TOLERANCE_FT {
            VerticalMode::Alt
        } else {
            VerticalMode::Flch
        };
        self.vs_pid.reset();
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.mcp.speed = speed.max(0.0);
        self.speed_mode = SpeedMode::Manual;
    }

    /// Arm ILS capture on one runway only.
    pub fn arm_approach(&mut self, runway: impl Into<String>) {
        self.armed_runway = Some(runway.into());
    }

    /// Engage LNAV/VNAV/FMS on a new leg list, replacing any previous plan.
    pub fn activate_flight_plan(
        &mut self,
        legs: &[FlightLeg],
        phase: FlightPhase,
        approach_runway: Option<&str>,
    ) {
        let (altitude, speed) = match phase {
            FlightPhase::Climb => (self.defaults.cruise_altitude_ft, self.schedule.cruise_kt),
            FlightPhase::Descent | FlightPhase::Approach => {
                (self.defaults.approach_altitude_ft, self.defaults.approach_speed_kt)
            }
        };
        self.mcp.altitude = altitude;
        self.mcp.speed = speed;
        self.plan = FlightPlan::new(propagate(legs, altitude, speed));
        self.lateral = LateralMode::Lnav;
        self.vertical = VerticalMode::Vnav;
        self.speed_mode = SpeedMode::Fms;
        self.phase = Some(phase);
        self.armed_runway = approach_runway.map(str::to_string);
        self.vs_pid.reset();
    }

    /// Follow a new lateral route while keeping the vertical and speed modes.
    pub fn proceed_direct(&mut self, legs: &[FlightLeg]) {
        self.plan = FlightPlan::new(propagate(legs, self.mcp.altitude, self.mcp.speed));
        self.lateral = LateralMode::Lnav;
    }

    // -- landing sequence ---------------------------------------------------

    /// ILS capture, touchdown and go-around. Called once per tick before `update`.
    pub fn manage_approach(
        &mut self,
        aircraft: &mut dyn AircraftControl,
        airport: &dyn Airport,
    ) -> Option<ApproachEvent> {
        match aircraft.flight_state() {
            FlightState::Flying => self.try_capture(aircraft, airport),
            FlightState::Landing => self.track_landing(aircraft),
            _ => None,
        }
    }

    fn try_capture(
        &mut self,
        aircraft: &mut dyn AircraftControl,
        airport: &dyn Airport,
    ) -> Option<ApproachEvent> {
        if self.phase == Some(FlightPhase::Climb) && self.armed_runway.is_none() {
            return None;
        }
        let position = aircraft.position();
        let (altitude, heading) = (aircraft.altitude(), aircraft.heading());
        let aligned = |rwy: &&Runway| rwy.is_aligned(&position, altitude, heading, &self.defaults.ils);
        let runway = match &self.armed_runway {
            Some(id) => airport.runway(id).filter(aligned),
            None => airport.runways().iter().find(aligned),
        }?
        .clone();

        aircraft.set_flight_state(FlightState::Landing);
        self.lateral = LateralMode::Loc;
        self.vertical = VerticalMode::Gs;
        self.speed_mode = SpeedMode::Manual;
        self.mcp.speed = ILS_APPROACH_SPEED_KT;
        self.plan.clear();
        self.armed_runway = None;
        self.phase = Some(FlightPhase::Approach);
        self.vs_pid.reset();
        info!(runway = %runway.id, altitude = altitude.round(), "established on the ILS");
        let event = ApproachEvent::Captured { runway: runway.id.clone() };
        self.captured_runway = Some(runway);
        Some(event)
    }

    fn track_landing(&mut self, aircraft: &mut dyn AircraftControl) -> Option<ApproachEvent> {
        let runway = self.captured_runway.as_ref()?;
        let position = aircraft.position();
        let height = aircraft.altitude() - runway.elevation_ft;

        if runway.distance_nm(&position) <= self.defaults.touchdown_distance_nm
            && height <= self.defaults.touchdown_height_ft
        {
            aircraft.set_flight_state(FlightState::Landed);
            self.vertical = VerticalMode::Flare;
            self.lateral = LateralMode::Rollout;
            info!(runway = %runway.id, "touchdown");
            return Some(ApproachEvent::Touchdown { runway: runway.id.clone() });
        }

        if runway.along_track_nm(&position) > 0.0 {
            let runway = self.captured_runway.take()?;
            aircraft.set_flight_state(FlightState::Flying);
            self.lateral = LateralMode::Hdg;
            self.mcp.heading = runway.heading;
            self.vertical = VerticalMode::Flch;
            self.mcp.altitude = self.defaults.missed_approach_altitude_ft;
            self.speed_mode = SpeedMode::Manual;
            self.mcp.speed = self.defaults.approach_speed_kt;
            self.vs_pid.reset();
            info!(runway = %runway.id, height = height.round(), "going around");
            return Some(ApproachEvent::GoAround { runway: runway.id });
        }
        None
    }

    // -- per-tick command generation ------------------------------------------

    /// Compute this tick's targets and commands and latch them onto the aircraft.
    pub fn update(&mut self, aircraft: &mut dyn AircraftControl, airport: &dyn Airport, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.check_transitions(aircraft);

        let target_heading = self.lateral_target(aircraft, airport);
        let heading_error = heading_difference(aircraft.heading(), target_heading);
        let max_bank = aircraft.limits().max_bank_deg;
        let bank_deg = self.bank_pid.update(heading_error, dt).clamp(-max_bank, max_bank);

        let target_altitude = self.vertical_target(aircraft);
        let vertical_speed_fpm = self.vertical_speed(target_altitude - aircraft.altitude(), dt);

        let target_speed = self.speed_target(aircraft);

        let command = ControlCommand {
            target_heading,
            target_altitude,
            target_speed,
            bank_deg,
            vertical_speed_fpm,
        };
        aircraft.apply(&command);
        self.last_command = command;

        self.log_mode_changes();
    }

    fn check_transitions(&mut self, aircraft: &dyn AircraftControl) {
        if self.lateral == LateralMode::Lnav && self.plan.is_exhausted() {
            self.lateral = LateralMode::Hdg;
            self.mcp.heading = normalize_heading(aircraft.heading());
            if matches!(self.vertical, VerticalMode::Vnav | VerticalMode::VnavAlt) {
                self.vertical = VerticalMode::Flch;
            }
        }

        let altitude = aircraft.altitude();
        match self.vertical {
            VerticalMode::Flch => {
                if (self.mcp.altitude - altitude).abs() <= ALTITUDE_CAPTURE_TOLERANCE_FT {
                    self.vertical = VerticalMode::Alt;
                }
            }
            VerticalMode::Vnav => {
                if (self.vnav_altitude() - altitude).abs() <= ALTITUDE_CAPTURE_TOLERANCE_FT {
                    self.vertical = VerticalMode::VnavAlt;
                }
            }
            VerticalMode::VnavAlt => {
                if (self.vnav_altitude() - altitude).abs() > ALTITUDE_CAPTURE_TOLERANCE_FT {
                    self.vertical = VerticalMode::Vnav;
                }
            }
            VerticalMode::Alt | VerticalMode::Gs | VerticalMode::Flare => {}
        }
    }

    fn lateral_target(&mut self, aircraft: &dyn AircraftControl, airport: &dyn Airport) -> f64 {
        let position = aircraft.position();
        match self.lateral {
            LateralMode::Hdg => self.mcp.heading,
            LateralMode::Lnav => self
                .plan
                .guidance_heading(&position, airport)
                .unwrap_or_else(|| aircraft.heading()),
            LateralMode::Loc | LateralMode::Rollout => match &self.captured_runway {
                Some(rwy) => rwy.localizer_heading(&position),
                None => self.mcp.heading,
            },
        }
    }

    fn vnav_altitude(&self) -> f64 {
        self.plan.active().map_or(self.mcp.altitude, |leg| leg.altitude_target)
    }

    fn vertical_target(&self, aircraft: &dyn AircraftControl) -> f64 {
        match self.vertical {
            VerticalMode::Alt | VerticalMode::Flch => self.mcp.altitude,
            VerticalMode::Vnav | VerticalMode::VnavAlt => self.vnav_altitude(),
            VerticalMode::Gs | VerticalMode::Flare => match &self.captured_runway {
                // The glidepath is never chased upward.
                Some(rwy) => rwy.glideslope_altitude(&aircraft.position()).min(aircraft.altitude()),
                None => self.mcp.altitude,
            },
        }
    }

    fn vertical_speed(&mut self, error: f64, dt: f64) -> f64 {
        let pid = self.vs_pid.update(error, dt);
        if self.vertical.is_level_change() && error.abs() > FLCH_OVERRIDE_THRESHOLD_FT {
            return FLCH_OVERRIDE_VS_FPM.copysign(error);
        }
        if error.abs() <= ALTITUDE_DEADBAND_FT {
            return pid;
        }
        if pid.abs() < MIN_CAPTURE_VS_FPM || pid.signum() != error.signum() {
            MIN_CAPTURE_VS_FPM.copysign(error)
        } else {
            pid
        }
    }

    fn speed_target(&self, aircraft: &dyn AircraftControl) -> f64 {
        match self.speed_mode {
            SpeedMode::Manual => self.mcp.speed,
            SpeedMode::Fms => self.schedule.target(
                aircraft.performance(),
                aircraft.altitude(),
                &[
                    self.plan.active().map(|leg| leg.speed_target),
                    self.plan.active_speed_limit(),
                    self.plan.upcoming_speed_limit(),
                ],
            ),
        }
    }

    fn log_mode_changes(&mut self) {
        let modes = (self.lateral, self.vertical, self.speed_mode);
        if modes != self.logged_modes {
            debug!(
                lateral = %modes.0,
                vertical = %modes.1,
                speed = %modes.2,
                "autopilot mode change"
            );
            self.logged_modes = modes;
        }
    }
}
