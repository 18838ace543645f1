//! Motion State Machine (C4): the pure status-transition function.
//!
//! Grounded directly on `update_motor_velocity()` in `stepper_motor.c`: the
//! status only ever moves `Accelerating -> ConstantVelocity -> Decelerating
//! -> Stopped`, with `Homing` as a separate terminal-velocity branch that
//! exits straight to `Stopped`. This module holds the decision logic only;
//! [`crate::integrator`] owns the numeric integration that feeds it.

use crate::status::Status;

/// Whether the current tick should switch from accelerating/constant-velocity
/// into the decelerating leg, given the remaining distance to the target and
/// the freshly estimated braking distance (§4.4, "start decelerating when
/// the remaining distance matches the estimated braking distance").
pub fn should_start_decelerating(status: Status, braking_distance: f32, distance_to_target: f32) -> bool {
    matches!(status, Status::Accelerating | Status::ConstantVelocity) && braking_distance >= distance_to_target
}

/// Whether the braking curve needs the over-brake correction this tick: only
/// while already decelerating, and only when the estimate says we're running
/// long (braking distance still bigger than what's left to travel).
pub fn needs_over_brake_correction(status: Status, braking_distance: f32, distance_to_target: f32) -> bool {
    status == Status::Decelerating && braking_distance > distance_to_target
}

/// Clamps velocity into `[v_min, v_max]`, reporting the status that should
/// follow from having saturated at either bound. A non-saturating velocity
/// leaves `status` as given by the caller.
pub fn clamp_velocity(velocity: f32, v_min: f32, v_max: f32, status: Status) -> (f32, Status) {
    if velocity > v_max {
        (v_max, Status::ConstantVelocity)
    } else if velocity < v_min {
        (v_min, Status::ConstantVelocity)
    } else {
        (velocity, status)
    }
}
