//! Command Dispatcher (C5): validates and applies host register writes.
//!
//! Grounded on `app_write_REG_*` in `app_funcs.c`. Every setter clamps
//! rather than rejects (matching `app_write_REG_MIN_VELOCITY` et al., which
//! write back the clamped value and report `false`), except for
//! move/home-start requests, which can be refused outright while a move is
//! already in progress.

use core::sync::atomic::Ordering;

use crate::controller::{store_f32, MotionController};
use crate::hal::{PulseOutput, StepTimer};
use crate::params::MotionParameters;
use crate::registers::{control_bits, home_steps_events, move_to_events, ParametricMoveTo};
use crate::status::Status;

/// Why a dispatch call did not do what was asked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub enum DispatchError {
    /// The motor is disabled; motion commands are refused outright.
    MotorDisabled,
    /// A move or homing pass is already in progress.
    AlreadyMoving,
    /// Homing was requested but `ENABLE_HOMING` was never set.
    HomingDisabled,
    /// One or more of a parametric move's parameters failed validation;
    /// the move was not started, though valid fields were still clamped
    /// and stored (matching the original's all-or-nothing commit gate).
    InvalidParameters,
    /// Homing is enabled but no homing pass has ever completed, so the
    /// axis has no reference to move relative to.
    HomingMissing,
    /// Homing is enabled and the requested target is negative, which is
    /// only meaningful once the axis has a zeroed home reference.
    InvalidPosition,
    /// A homing pass was requested but the home switch already reads
    /// active, so there is nothing to seek.
    AlreadyHome,
}

impl MotionController {
    /// Applies a `CONTROL` register write. Enable bits win over disable
    /// bits for the same feature within one write; disabling the motor
    /// while it's moving stops it immediately.
    pub fn write_control(&self, bits: u16, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        if bits & control_bits::ENABLE_HOMING != 0 {
            self.homing_enabled.store(true, Ordering::Relaxed);
        } else if bits & control_bits::DISABLE_HOMING != 0 {
            self.homing_enabled.store(false, Ordering::Relaxed);
        }

        if bits & control_bits::ENABLE_MOTOR != 0 {
            self.motor_enabled.store(true, Ordering::Relaxed);
            pulse_out.enable();
        } else if bits & control_bits::DISABLE_MOTOR != 0 {
            if self.status() != Status::Stopped {
                self.emergency_stop(timer, pulse_out);
            }
            self.motor_enabled.store(false, Ordering::Relaxed);
            pulse_out.disable();
        }

        if bits & control_bits::ENABLE_ANALOG != 0 {
            self.analog_enabled.store(true, Ordering::Relaxed);
        } else if bits & control_bits::DISABLE_ANALOG != 0 {
            self.analog_enabled.store(false, Ordering::Relaxed);
        }

        if bits & control_bits::ENABLE_ENCODER != 0 {
            self.encoder_enabled.store(true, Ordering::Relaxed);
        } else if bits & control_bits::DISABLE_ENCODER != 0 {
            self.encoder_enabled.store(false, Ordering::Relaxed);
        }

        if bits & control_bits::RESET_ENCODER != 0 {
            self.encoder_reset_event.raise();
        }
    }

    pub fn set_min_velocity(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_v_min(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_max_velocity(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_v_max(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_acceleration(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_a_accel(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_deceleration(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_a_decel(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_acceleration_jerk(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_j_accel(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_deceleration_jerk(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_j_decel(requested);
        self.store_parameters(&params);
        accepted
    }

    pub fn set_home_velocity(&self, requested: f32) -> bool {
        let mut params = self.parameters();
        let accepted = params.set_v_home(requested);
        self.store_parameters(&params);
        accepted
    }

    /// Starts an immediate move to `target`, using whatever parameters are
    /// currently in effect. If the motor is already moving, only the
    /// target is updated (the original firmware re-derives direction and
    /// lets the existing velocity carry over rather than restarting the
    /// ramp).
    pub fn move_to(&self, target: i32, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) -> Result<(), DispatchError> {
        if !self.is_motor_enabled() {
            self.move_to_events.raise(move_to_events::MOTOR_DISABLED);
            return Err(DispatchError::MotorDisabled);
        }
        if self.is_homing_active() {
            self.move_to_events.raise(move_to_events::CURRENTLY_HOMING);
            return Err(DispatchError::AlreadyMoving);
        }
        if self.is_homing_enabled() && !self.has_homed() {
            self.move_to_events.raise(move_to_events::HOMING_MISSING);
            return Err(DispatchError::HomingMissing);
        }
        if self.is_homing_enabled() && target < 0 {
            self.move_to_events.raise(move_to_events::INVALID_POSITION);
            return Err(DispatchError::InvalidPosition);
        }
        let params = self.parameters();
        if params.v_max < params.v_min {
            self.move_to_events.raise(move_to_events::INVALID_PARAMETERS);
            return Err(DispatchError::InvalidParameters);
        }

        // Read the current position and commit the new target as one unit:
        // the pulse ISR reads both concurrently, and a torn read could pick
        // a direction for a position that no longer matches the target just
        // written (`move_to_target_position()`'s `PMIC_CTRL` guard).
        let (current, forward) = critical_section::with(|_| {
            let current = self.position_current.load(Ordering::Relaxed);
            self.position_target.store(target, Ordering::Relaxed);
            (current, target > current)
        });
        if target == current {
            return Ok(());
        }

        self.direction_forward.store(forward, Ordering::Relaxed);
        pulse_out.set_direction(forward);

        if !self.is_running() {
            let params = self.parameters();
            store_f32(&self.velocity_current, params.v_min);
            store_f32(&self.acceleration_current, params.a_accel);
            store_f32(&self.jerk_current, params.j_accel);
            self.set_status(Status::Accelerating);
            self.is_running.store(true, Ordering::Relaxed);

            let period = crate::mathutil::roundf(crate::config::TICK_RATE_HZ as f32 / params.v_min) as u32;
            self.period_current.store(period, Ordering::Relaxed);
            timer.start(period);
        }
        Ok(())
    }

    /// Starts a move with a full parameter bundle (`MOVE_TO_PARAMETRIC`).
    /// Every field is validated and clamped into the controller's stored
    /// parameters regardless of outcome; the move itself is only started
    /// if every field was accepted unchanged.
    pub fn move_to_parametric(
        &self,
        request: ParametricMoveTo,
        timer: &mut impl StepTimer,
        pulse_out: &mut impl PulseOutput,
    ) -> Result<(), DispatchError> {
        let mut ok = true;
        ok &= self.set_min_velocity(request.v_min as f32);
        ok &= self.set_max_velocity(request.v_max as f32);
        ok &= self.set_acceleration(request.a_accel as f32);
        ok &= self.set_deceleration(request.a_decel as f32);
        ok &= self.set_acceleration_jerk(request.j_accel as f32);
        ok &= self.set_deceleration_jerk(request.j_decel as f32);

        if !ok {
            self.move_to_events.raise(move_to_events::INVALID_PARAMETERS);
            return Err(DispatchError::InvalidParameters);
        }
        self.move_to(request.target, timer, pulse_out)
    }

    /// Commands a fixed step period directly, bypassing the planner
    /// (`REG_DIRECT_VELOCITY`). A period of `0` stops the motor; otherwise
    /// the sign of the period selects direction the way
    /// `set_motor_step_period()` does.
    pub fn direct_velocity(&self, signed_period: i32, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        if signed_period == 0 {
            timer.stop();
            self.is_running.store(false, Ordering::Relaxed);
            self.set_status(Status::Stopped);
            return;
        }

        let forward = signed_period > 0;
        self.direction_forward.store(forward, Ordering::Relaxed);
        pulse_out.set_direction(forward);

        let period = (signed_period.unsigned_abs()).clamp(crate::config::PERIOD_MIN, crate::config::PERIOD_MAX);
        self.period_current.store(period, Ordering::Relaxed);
        self.set_status(Status::ConstantVelocity);
        if !timer.is_running() {
            self.is_running.store(true, Ordering::Relaxed);
            timer.start(period);
        }
    }

    /// Starts a homing pass. Refused if the motor is already moving, if
    /// homing hasn't been armed via `write_control`, if the motor isn't
    /// enabled, or if `home_switch_active` reports the home switch is
    /// already sitting on the switch (nothing to seek).
    pub fn start_homing(
        &self,
        max_distance: i32,
        home_switch_active: bool,
        timer: &mut impl StepTimer,
        pulse_out: &mut impl PulseOutput,
    ) -> Result<(), DispatchError> {
        if self.is_running() {
            return Err(DispatchError::AlreadyMoving);
        }
        if !self.is_homing_enabled() {
            return Err(DispatchError::HomingDisabled);
        }
        if !self.is_motor_enabled() {
            self.home_steps_events.raise(home_steps_events::MOTOR_DISABLED);
            return Err(DispatchError::MotorDisabled);
        }
        if home_switch_active {
            self.home_steps_events.raise(home_steps_events::ALREADY_HOME);
            return Err(DispatchError::AlreadyHome);
        }

        self.position_current.store(0, Ordering::Relaxed);
        self.position_target.store(max_distance, Ordering::Relaxed);

        let forward = max_distance > 0;
        self.direction_forward.store(forward, Ordering::Relaxed);
        pulse_out.set_direction(forward);

        let v_home = self.parameters().v_home;
        store_f32(&self.velocity_current, v_home);
        store_f32(&self.acceleration_current, 0.0);
        store_f32(&self.jerk_current, 0.0);
        self.set_status(Status::Homing);
        self.is_running.store(true, Ordering::Relaxed);

        let period = crate::mathutil::roundf(crate::config::TICK_RATE_HZ as f32 / v_home) as u32;
        self.period_current.store(period, Ordering::Relaxed);
        timer.start(period);
        Ok(())
    }

    /// Commands an immediate stop, equivalent to the estop path but
    /// reachable from a host register write (`REG_STOP_MOVEMENT`).
    pub fn stop_movement(&self, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        if self.is_running() {
            self.emergency_stop(timer, pulse_out);
        }
    }

    fn is_homing_active(&self) -> bool {
        self.status() == Status::Homing
    }
}
