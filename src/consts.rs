// ---------------------------------------------------------------------------
// Empirically tuned simulation constants
// ---------------------------------------------------------------------------

/// Distance at which a TF/DF leg's fix counts as passed, NM.
pub const FIX_CAPTURE_RADIUS_NM: f64 = 1.0;

/// Height of a 3° glideslope per NM of distance to the threshold, ft.
pub const GLIDESLOPE_FT_PER_NM: f64 = 318.44;

/// Altitude band within which a target altitude counts as captured, ft.
pub const ALTITUDE_CAPTURE_TOLERANCE_FT: f64 = 100.0;

/// Altitude error above which FLCH/VNAV command the fixed climb or descent, ft.
pub const FLCH_OVERRIDE_THRESHOLD_FT: f64 = 500.0;

/// Vertical speed commanded by the FLCH/VNAV override, ft/min.
pub const FLCH_OVERRIDE_VS_FPM: f64 = 6_000.0;

/// Speed flown once established on the ILS, kt.
pub const ILS_APPROACH_SPEED_KT: f64 = 150.0;

/// Regulatory speed ceiling below 10,000 ft, kt.
pub const BELOW_FL100_SPEED_LIMIT_KT: f64 = 250.0;

/// Altitude below which the 250 kt ceiling applies, ft.
pub const SPEED_LIMIT_ALTITUDE_FT: f64 = 10_000.0;

/// Altitude below which departures fly their initial-climb speed, ft.
pub const INITIAL_CLIMB_ALTITUDE_FT: f64 = 3_000.0;

/// Altitude above which the speed schedule switches from IAS-like speed to Mach, ft.
pub const MACH_TRANSITION_ALTITUDE_FT: f64 = 26_000.0;

/// Minimum radar separation, NM.
pub const MIN_HORIZONTAL_SEPARATION_NM: f64 = 5.0;

/// Minimum vertical separation, ft.
pub const MIN_VERTICAL_SEPARATION_FT: f64 = 1_000.0;

/// Extra horizontal distance beyond the minimum that raises a warning, NM.
pub const SEPARATION_WARNING_BUFFER_NM: f64 = 3.0;

/// Default wake-turbulence minimum when no specific pairing applies.
pub const DEFAULT_WAKE_DISTANCE_NM: f64 = 3.0;
pub const DEFAULT_WAKE_TIME_S: f64 = 40.0;
