//! Braking Estimator (C3).
//!
//! Computes the distance required to bring the motor from `v_current` down
//! to `v_min` under the current deceleration/jerk, grounded on
//! `calculate_braking_distance()` in the original firmware
//! (`stepper_motor.c`).

use crate::mathutil::sqrtf;

/// Estimates braking distance in steps.
///
/// Returns `None` when the jerk-limited quadratic has no real solution
/// (the motor cannot be brought to `v_min` with the current deceleration
/// and jerk before the jerk term would need to reverse sign again) — callers
/// treat a missing solution as transient and hold their last estimate.
pub fn estimate(v_current: f32, v_min: f32, a_decel: f32, j_decel: f32) -> Option<f32> {
    let velocity = v_current - v_min;
    if velocity <= 0.0 {
        return Some(0.0);
    }

    if j_decel == 0.0 {
        // Closed form: d = v^2 / (2 * |a_decel|).
        let distance = (velocity * velocity) / (2.0 * (-a_decel));
        return Some(distance);
    }

    // Solve v0 + a0*t + 1/2*j*t^2 = 0 for the smaller positive root:
    // t = (-a0 - sqrt(a0^2 - 4*j*v0)) / (2*j)
    let discriminant = a_decel * a_decel - 4.0 * j_decel * velocity;
    if discriminant < 0.0 {
        return None;
    }
    let root = sqrtf(discriminant);
    let time = (-a_decel - root) / (2.0 * j_decel);

    let distance = time * (velocity + (a_decel * time / 2.0) + (j_decel * time * time / 6.0));
    Some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_jerk_matches_closed_form() {
        // v_current=2000, v_min=400, a_decel=-1000 -> d = 1600^2 / 2000 = 1280
        let d = estimate(2000.0, 400.0, -1000.0, 0.0).unwrap();
        assert!((d - 1280.0).abs() < 1e-3, "d={d}");
    }

    #[test]
    fn already_at_minimum_needs_no_distance() {
        assert_eq!(estimate(400.0, 400.0, -1000.0, 0.0), Some(0.0));
        assert_eq!(estimate(100.0, 400.0, -1000.0, 0.0), Some(0.0));
    }

    #[test]
    fn general_form_converges_to_closed_form_as_jerk_shrinks() {
        let closed = estimate(2000.0, 400.0, -1000.0, 0.0).unwrap();
        let general = estimate(2000.0, 400.0, -1000.0, -0.5).unwrap();
        assert!((closed - general).abs() < 5.0, "closed={closed} general={general}");
    }

    #[test]
    fn negative_discriminant_reports_no_solution() {
        // A weak deceleration combined with a jerk fighting it (same sign as
        // the velocity delta) can make the quadratic have no real root.
        let result = estimate(10_000.0, 400.0, -10.0, 1.0);
        assert!(result.is_none());
    }
}
