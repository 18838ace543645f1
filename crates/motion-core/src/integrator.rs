//! Velocity Integrator (C2): the 500 µs main-loop tick.
//!
//! Grounded on `update_motor_velocity()` in `stepper_motor.c`. Runs outside
//! any ISR, so it can afford the trig-free but still nontrivial braking
//! estimate; the ISRs it feeds only ever read the period it leaves behind.

use core::sync::atomic::Ordering;

use crate::braking;
use crate::config::{PERIOD_MAX, PERIOD_MIN, TICK_RATE_HZ, TICK_SECONDS};
use crate::controller::{load_f32, store_f32, MotionController};
use crate::machine;
use crate::status::Status;

fn period_for_velocity(velocity: f32) -> u32 {
    let period = crate::mathutil::roundf(TICK_RATE_HZ as f32 / velocity) as u32;
    period.clamp(PERIOD_MIN, PERIOD_MAX)
}

impl MotionController {
    /// Advances the kinematic state by one 500 µs tick. No-op when the
    /// motor is stopped or homing (homing runs at a fixed crawl velocity
    /// with no acceleration curve, per `move_to_home()`).
    pub fn tick_500us(&self) {
        let status = self.status();
        if status == Status::Stopped || status == Status::Homing {
            return;
        }

        let target = self.position_target.load(Ordering::Relaxed);
        let current = self.position_current.load(Ordering::Relaxed);
        let distance_to_target = (target - current).unsigned_abs() as f32;

        let params = self.parameters();
        let velocity = load_f32(&self.velocity_current);

        // When the estimator reports "no solution" (the jerk-limited
        // quadratic has no real root), hold the last good estimate rather
        // than snapping to zero, matching the original firmware's NaN
        // handling: `motor_current_braking_distance` is simply left
        // untouched when `calculate_braking_distance()` returns NaN.
        let braking_distance = braking::estimate(velocity, params.v_min, params.a_decel, params.j_decel)
            .unwrap_or_else(|| self.braking_distance.load(Ordering::Relaxed) as f32);
        self.braking_distance.store(braking_distance.max(0.0) as u32, Ordering::Relaxed);

        let status = if machine::should_start_decelerating(status, braking_distance, distance_to_target) {
            store_f32(&self.acceleration_current, params.a_decel);
            store_f32(&self.jerk_current, params.j_decel);
            self.set_status(Status::Decelerating);
            Status::Decelerating
        } else {
            status
        };

        let velocity = if machine::needs_over_brake_correction(status, braking_distance, distance_to_target) {
            // Slow down a little harder to compensate, weighted more
            // strongly as velocity approaches v_min (stepper_motor.c's
            // `tweak` factor).
            let ratio = params.v_min / velocity;
            let tweak = 1.0 - (ratio * ratio) * crate::config::OVER_BRAKE_COEFFICIENT;
            velocity * tweak
        } else {
            velocity
        };

        let jerk = load_f32(&self.jerk_current);
        let acceleration = load_f32(&self.acceleration_current) + jerk * TICK_SECONDS;
        let velocity = velocity + acceleration * TICK_SECONDS;
        store_f32(&self.acceleration_current, acceleration);

        let (velocity, status) = machine::clamp_velocity(velocity, params.v_min, params.v_max, status);
        store_f32(&self.velocity_current, velocity);
        self.set_status(status);

        let period = period_for_velocity(velocity);
        self.period_current.store(period, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MotionParameters;

    #[test]
    fn idle_tick_is_a_no_op() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.tick_500us();
        assert_eq!(ctrl.status(), Status::Stopped);
        assert_eq!(ctrl.velocity(), 0.0);
    }

    #[test]
    fn accelerating_move_ramps_velocity_up_each_tick() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.position_target.store(1_000_000, Ordering::Relaxed);
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::Accelerating);
        store_f32(&ctrl.velocity_current, ctrl.parameters().v_min);

        let v0 = ctrl.velocity();
        ctrl.tick_500us();
        let v1 = ctrl.velocity();
        assert!(v1 > v0, "v0={v0} v1={v1}");
        assert_eq!(ctrl.status(), Status::Accelerating);
    }

    #[test]
    fn switches_to_decelerating_once_braking_distance_catches_up() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.position_target.store(1000, Ordering::Relaxed);
        ctrl.position_current.store(950, Ordering::Relaxed);
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::ConstantVelocity);
        store_f32(&ctrl.velocity_current, 20_000.0);

        ctrl.tick_500us();
        assert_eq!(ctrl.status(), Status::Decelerating);
    }

    #[test]
    fn velocity_never_exceeds_configured_max() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.position_target.store(10_000_000, Ordering::Relaxed);
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::Accelerating);
        store_f32(&ctrl.velocity_current, ctrl.parameters().v_max - 1.0);

        for _ in 0..10 {
            ctrl.tick_500us();
        }
        assert!(ctrl.velocity() <= ctrl.parameters().v_max);
    }
}
