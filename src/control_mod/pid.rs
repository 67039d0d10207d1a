use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// PID Controller (three axes, control-space vectors)
// ---------------------------------------------------------------------------

/// Output bound per axis.
const OUTPUT_LIMIT: f64 = 1.0;
/// If clamping moved the result by more than this, the integrator update
/// for the tick is rolled back (anti-windup).
const WINDUP_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct Pid {
    kp: f64,
    ki: f64,
    kd: f64,
    prev_error: Vector3<f64>,
    integral: Vector3<f64>,
    derivative: Vector3<f64>,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            prev_error: Vector3::zeros(),
            integral: Vector3::zeros(),
            derivative: Vector3::zeros(),
        }
    }

    /// One tick of the filter. `dt` must be strictly positive; the host's
    /// fixed-tick driver guarantees this.
    pub fn compute(&mut self, error: Vector3<f64>, dt: f64) -> Vector3<f64> {
        debug_assert!(dt > 0.0, "dt must be positive, got {dt}");

        self.integral += error * dt;
        self.derivative = (error - self.prev_error) / dt;

        let raw = self.kp * error + self.ki * self.integral + self.kd * self.derivative;
        let clamped = raw.map(|v| v.clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT));

        // Anti-windup: while the output is saturated, do not let the
        // integrator keep accumulating this tick's error.
        if (clamped - raw).norm() > WINDUP_TOLERANCE {
            self.integral -= error * dt;
        }

        self.prev_error = error;

        clamped
    }

    /// Clear all accumulated state, previous error included, so replaying
    /// an error sequence reproduces the original outputs exactly.
    pub fn reset(&mut self) {
        self.prev_error = Vector3::zeros();
        self.integral = Vector3::zeros();
        self.derivative = Vector3::zeros();
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// Gain setters reset accumulated state: stale integral history under
    /// new gains would produce a discontinuous jump. Setting the same value
    /// is a no-op and preserves state.
    pub fn set_kp(&mut self, kp: f64) {
        if self.kp == kp {
            return;
        }
        self.kp = kp;
        self.reset();
    }

    pub fn set_ki(&mut self, ki: f64) {
        if self.ki == ki {
            return;
        }
        self.ki = ki;
        self.reset();
    }

    pub fn set_kd(&mut self, kd: f64) {
        if self.kd == kd {
            return;
        }
        self.kd = kd;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.02;

    #[test]
    fn zero_error_stays_zero() {
        let mut pid = Pid::new(12.0, 10.0, 20.0);
        for _ in 0..500 {
            let out = pid.compute(Vector3::zeros(), DT);
            assert_eq!(out, Vector3::zeros());
        }
        assert_eq!(pid.integral, Vector3::zeros());
    }

    #[test]
    fn proportional_only() {
        let mut pid = Pid::new(1.0, 0.0, 0.0);
        let out = pid.compute(Vector3::new(0.5, -0.25, 0.0), DT);
        assert!((out.x - 0.5).abs() < 1e-12);
        assert!((out.y + 0.25).abs() < 1e-12);
        assert_eq!(out.z, 0.0);
    }

    #[test]
    fn output_is_bounded() {
        let mut pid = Pid::new(100.0, 0.0, 0.0);
        let out = pid.compute(Vector3::new(1.0, -1.0, 0.3), DT);
        assert_eq!(out.x, 1.0);
        assert_eq!(out.y, -1.0);
        assert!(out.z <= 1.0);
    }

    #[test]
    fn anti_windup_freezes_integral_under_saturation() {
        let mut pid = Pid::new(0.0, 1.0, 0.0);
        let error = Vector3::new(10.0, 0.0, 0.0);
        // Drive well past saturation, then verify the integral has stopped
        // growing instead of winding up forever.
        for _ in 0..10 {
            pid.compute(error, DT);
        }
        let at_saturation = pid.integral.x;
        for _ in 0..100 {
            pid.compute(error, DT);
        }
        assert!(
            pid.integral.x <= at_saturation + 1e-9,
            "integral kept winding up: {} -> {}",
            at_saturation,
            pid.integral.x
        );
    }

    #[test]
    fn integral_accumulates_while_unsaturated() {
        let mut pid = Pid::new(0.0, 1.0, 0.0);
        let error = Vector3::new(0.5, 0.0, 0.0);
        let a = pid.compute(error, DT).x;
        let b = pid.compute(error, DT).x;
        assert!(b > a, "unsaturated integral term should grow: {a} vs {b}");
    }

    #[test]
    fn reset_replays_bit_for_bit() {
        let mut pid = Pid::new(2.0, 0.4, 0.1);
        let sequence: Vec<Vector3<f64>> = (0..50)
            .map(|i| Vector3::new((i as f64 * 0.13).sin(), (i as f64 * 0.07).cos(), 0.02 * i as f64))
            .collect();

        let first: Vec<_> = sequence.iter().map(|e| pid.compute(*e, DT)).collect();
        pid.reset();
        let second: Vec<_> = sequence.iter().map(|e| pid.compute(*e, DT)).collect();

        assert_eq!(first, second, "reset must clear every piece of hidden state");
    }

    #[test]
    fn gain_change_resets_state() {
        let mut pid = Pid::new(0.0, 1.0, 0.0);
        pid.compute(Vector3::new(0.5, 0.0, 0.0), DT);
        assert!(pid.integral.x > 0.0);
        pid.set_ki(2.0);
        assert_eq!(pid.integral, Vector3::zeros());
        assert_eq!(pid.prev_error, Vector3::zeros());
    }

    #[test]
    fn same_gain_preserves_state() {
        let mut pid = Pid::new(0.0, 1.0, 0.0);
        pid.compute(Vector3::new(0.5, 0.0, 0.0), DT);
        let integral = pid.integral;
        pid.set_ki(1.0);
        assert_eq!(pid.integral, integral);
    }

    #[test]
    fn prev_error_updates_even_when_saturated() {
        let mut pid = Pid::new(0.0, 1.0, 1.0);
        let big = Vector3::new(50.0, 0.0, 0.0);
        pid.compute(big, DT);
        assert_eq!(pid.prev_error, big);
    }
}
