use crate::physics::units::finite_or_zero;

// ---------------------------------------------------------------------------
// PID Controller (single axis)
// ---------------------------------------------------------------------------

/// Single-axis PID with output clamping.
///
/// Anti-windup is conditional integration: the integral is frozen while the
/// unclamped output is already saturated in the direction of the error.
#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub min: f64,
    pub max: f64,
    integral: f64,
    prev_error: f64,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.min = min.min(max);
        self.max = max.max(min);
        self
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        if dt <= 0.0 || !error.is_finite() {
            return 0.0;
        }
        let derivative = (error - self.prev_error) / dt;
        let pd = self.kp * error + self.kd * derivative;

        let unclamped = pd + self.ki * self.integral;
        let saturated = (unclamped >= self.max && error > 0.0) || (unclamped <= self.min && error < 0.0);
        if !saturated {
            self.integral += error * dt;
        }
        self.prev_error = error;

        finite_or_zero((pd + self.ki * self.integral).clamp(self.min, self.max))
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}
