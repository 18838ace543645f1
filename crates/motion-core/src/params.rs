//! Motion tuning parameters (plain data, validated at the write boundary).
//!
//! Grounded on `app_write_REG_MIN_VELOCITY`/`REG_MAX_VELOCITY`/etc in
//! `app_funcs.c`: every setter clamps to the hardware-legal range and
//! reports whether the requested value had to be clamped, rather than
//! rejecting the write outright.

use crate::config::{V_HW_MAX, V_HW_MIN};

/// The tunable constants of one move: velocity bounds, acceleration and
/// jerk for both the accelerating and decelerating legs, and the homing
/// crawl velocity. All fields are `Copy` so a snapshot can be taken without
/// locking: plain values, no interior mutability here — the controller is
/// the one that wraps these in atomics.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub struct MotionParameters {
    pub v_min: f32,
    pub v_max: f32,
    pub a_accel: f32,
    pub a_decel: f32,
    pub j_accel: f32,
    pub j_decel: f32,
    pub v_home: f32,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            v_min: V_HW_MIN as f32,
            v_max: V_HW_MAX as f32,
            a_accel: 1000.0,
            a_decel: -1000.0,
            j_accel: 0.0,
            j_decel: 0.0,
            v_home: V_HW_MIN as f32 * 4.0,
        }
    }
}

impl MotionParameters {
    /// Clamps `v_min` into `[V_HW_MIN, V_HW_MAX]` and returns whether the
    /// requested value was accepted unchanged. Clamped independently of the
    /// current `v_max`, so `v_min > v_max` is a reachable state left for the
    /// move dispatcher to reject.
    pub fn set_v_min(&mut self, requested: f32) -> bool {
        let clamped = requested.clamp(V_HW_MIN as f32, V_HW_MAX as f32);
        self.v_min = clamped;
        clamped == requested
    }

    /// Clamps `v_max` into `[V_HW_MIN, V_HW_MAX]` and returns whether the
    /// requested value was accepted unchanged. See [`Self::set_v_min`].
    pub fn set_v_max(&mut self, requested: f32) -> bool {
        let clamped = requested.clamp(V_HW_MIN as f32, V_HW_MAX as f32);
        self.v_max = clamped;
        clamped == requested
    }

    /// Accelerations must push velocity in the expected direction: positive
    /// while speeding up, negative while slowing down. A zero or
    /// wrong-signed value is rejected (the field is left unchanged).
    pub fn set_a_accel(&mut self, requested: f32) -> bool {
        if requested > 0.0 {
            self.a_accel = requested;
            true
        } else {
            false
        }
    }

    pub fn set_a_decel(&mut self, requested: f32) -> bool {
        if requested < 0.0 {
            self.a_decel = requested;
            true
        } else {
            false
        }
    }

    /// Jerk may be zero (trapezoidal acceleration ramp) or any finite value.
    pub fn set_j_accel(&mut self, requested: f32) -> bool {
        if requested.is_finite() {
            self.j_accel = requested;
            true
        } else {
            false
        }
    }

    pub fn set_j_decel(&mut self, requested: f32) -> bool {
        if requested.is_finite() {
            self.j_decel = requested;
            true
        } else {
            false
        }
    }

    /// Homing velocity is clamped the same way `v_min`/`v_max` are.
    pub fn set_v_home(&mut self, requested: f32) -> bool {
        let clamped = requested.clamp(V_HW_MIN as f32, V_HW_MAX as f32);
        self.v_home = clamped;
        clamped == requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v_min_clamps_below_hardware_floor() {
        let mut p = MotionParameters::default();
        assert!(!p.set_v_min(1.0));
        assert_eq!(p.v_min, V_HW_MIN as f32);
    }

    #[test]
    fn v_max_clamps_to_hardware_ceiling_independent_of_v_min() {
        let mut p = MotionParameters::default();
        p.v_min = 500.0;
        assert!(!p.set_v_max(V_HW_MAX as f32 + 1.0));
        assert_eq!(p.v_max, V_HW_MAX as f32);
    }

    #[test]
    fn v_max_below_v_min_is_reachable() {
        let mut p = MotionParameters::default();
        p.v_min = 500.0;
        assert!(p.set_v_max(100.0), "hardware bounds alone accept this value");
        assert_eq!(p.v_max, 100.0);
        assert!(p.v_max < p.v_min);
    }

    #[test]
    fn accel_rejects_wrong_sign() {
        let mut p = MotionParameters::default();
        let before = p.a_accel;
        assert!(!p.set_a_accel(-5.0));
        assert_eq!(p.a_accel, before);
        assert!(p.set_a_accel(250.0));
        assert_eq!(p.a_accel, 250.0);
    }

    #[test]
    fn jerk_rejects_non_finite() {
        let mut p = MotionParameters::default();
        assert!(!p.set_j_accel(f32::NAN));
        assert!(p.set_j_accel(12.5));
    }
}
