//! Safety Supervisor (C6): the stop-switch and home-switch edge handlers.
//!
//! Grounded on `ISR(PORTB_INT0_vect)` (stop switch) and
//! `ISR(PORTC_INT0_vect)` (home switch) in `interrupts.c`. Both switches are
//! wired active-low; `is_triggered` on [`crate::hal::DigitalInput`] already
//! accounts for that, so this module only deals with the debounced logical
//! level.

use core::sync::atomic::Ordering;

use crate::config::HOME_DEBOUNCE_TICKS;
use crate::controller::MotionController;
use crate::hal::{PulseOutput, StepTimer};
use crate::registers::{home_steps_events, move_to_events};
use crate::status::Status;

impl MotionController {
    /// Called from the stop-switch edge interrupt, once per edge in either
    /// direction. On the active edge, halts all motion immediately and
    /// clears `motor_enabled`; this is the estop path and is not gated by
    /// `homing_enabled` or any debounce — it fires on every active edge. On
    /// the release edge, only the `STOP_SWITCH` register level is updated
    /// for the host to observe.
    pub fn on_stop_switch_triggered(&self, active: bool, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        self.stop_switch_state.store(active, Ordering::Relaxed);
        self.stop_switch_dirty.store(true, Ordering::Relaxed);

        if !active {
            return;
        }

        if self.is_running() {
            self.emergency_stop(timer, pulse_out);
        }
        self.motor_enabled.store(false, Ordering::Relaxed);
        pulse_out.disable();
    }

    /// Called once per 500 µs tick from the main loop to age out the home
    /// switch's debounce counter (`endstop_counter` resets to 0 after
    /// 10 ms in the original firmware's `core_callback_t_before_exec`).
    pub fn decay_home_debounce(&self) {
        let current = self.home_switch_debounce.load(Ordering::Relaxed);
        if current > 0 {
            let next = current.saturating_sub(1);
            self.home_switch_debounce.store(next, Ordering::Relaxed);
        }
    }

    /// Called from the home-switch edge interrupt. Ignored unless homing is
    /// enabled and the debounce window has elapsed.
    pub fn on_home_switch_triggered(&self, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        if !self.is_homing_enabled() || self.home_switch_debounce.load(Ordering::Relaxed) != 0 {
            return;
        }
        self.home_switch_debounce.store(HOME_DEBOUNCE_TICKS, Ordering::Relaxed);

        let was_homing = self.status() == Status::Homing;
        let was_stopped = self.status() == Status::Stopped;

        timer.stop();
        self.is_running.store(false, Ordering::Relaxed);
        crate::controller::store_f32(&self.velocity_current, 0.0);
        crate::controller::store_f32(&self.acceleration_current, 0.0);
        crate::controller::store_f32(&self.jerk_current, 0.0);
        self.braking_distance.store(0, Ordering::Relaxed);
        self.position_current.store(0, Ordering::Relaxed);
        self.homing_performed.store(true, Ordering::Relaxed);

        if was_homing {
            self.home_steps_events.raise(home_steps_events::HOMING_SUCCESSFUL);
        } else {
            self.home_steps_events.raise(home_steps_events::UNEXPECTED_HOME);
            if !was_stopped {
                self.move_to_events.raise(move_to_events::MOVE_ABORTED);
            }
        }

        self.set_status(Status::Stopped);
        self.motor_stopped_event.raise();
        pulse_out.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MotionParameters;
    use core::cell::Cell;

    #[derive(Default)]
    struct FakeTimer {
        running: Cell<bool>,
    }
    impl StepTimer for FakeTimer {
        fn set_period(&mut self, _period_ticks: u32) {}
        fn start(&mut self, _period_ticks: u32) {
            self.running.set(true);
        }
        fn stop(&mut self) {
            self.running.set(false);
        }
        fn is_running(&self) -> bool {
            self.running.get()
        }
    }

    #[derive(Default)]
    struct FakePulseOutput {
        disabled: bool,
    }
    impl PulseOutput for FakePulseOutput {
        fn set_direction(&mut self, _forward: bool) {}
        fn pulse(&mut self) {}
        fn enable(&mut self) {
            self.disabled = false;
        }
        fn disable(&mut self) {
            self.disabled = true;
        }
    }

    #[test]
    fn stop_switch_disables_motor_and_halts_motion() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.motor_enabled.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::ConstantVelocity);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_stop_switch_triggered(true, &mut timer, &mut out);

        assert!(!ctrl.is_running());
        assert!(!ctrl.is_motor_enabled());
        assert!(out.disabled);
        assert_eq!(ctrl.status(), Status::Stopped);
    }

    #[test]
    fn stop_switch_release_reports_level_without_touching_motion() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.motor_enabled.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::ConstantVelocity);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_stop_switch_triggered(false, &mut timer, &mut out);

        assert!(ctrl.is_running(), "release edge must not stop the motor");
        assert!(ctrl.is_motor_enabled());
        assert_eq!(ctrl.drain_tick().stop_switch, Some(false));
    }

    #[test]
    fn home_switch_during_homing_reports_success_and_zeros_position() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_homing_enabled(true);
        ctrl.set_status(Status::Homing);
        ctrl.position_current.store(1234, Ordering::Relaxed);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_home_switch_triggered(&mut timer, &mut out);

        assert_eq!(ctrl.position(), 0);
        assert!(ctrl.has_homed());
        assert_eq!(ctrl.home_steps_events.drain(), home_steps_events::HOMING_SUCCESSFUL);
        assert_eq!(ctrl.status(), Status::Stopped);
    }

    #[test]
    fn home_switch_while_not_homing_is_unexpected_and_aborts_move() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_homing_enabled(true);
        ctrl.set_status(Status::Accelerating);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_home_switch_triggered(&mut timer, &mut out);

        assert_eq!(ctrl.home_steps_events.drain(), home_steps_events::UNEXPECTED_HOME);
        assert_eq!(ctrl.move_to_events.drain(), move_to_events::MOVE_ABORTED);
    }

    #[test]
    fn home_switch_ignored_while_homing_disabled() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.set_status(Status::Accelerating);
        ctrl.position_current.store(42, Ordering::Relaxed);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_home_switch_triggered(&mut timer, &mut out);

        assert_eq!(ctrl.position(), 42);
        assert_eq!(ctrl.status(), Status::Accelerating);
    }

    #[test]
    fn home_switch_debounced_until_decayed() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.set_homing_enabled(true);
        ctrl.set_status(Status::Homing);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_home_switch_triggered(&mut timer, &mut out);
        ctrl.home_steps_events.drain();

        ctrl.position_current.store(7, Ordering::Relaxed);
        ctrl.set_status(Status::Homing);
        ctrl.on_home_switch_triggered(&mut timer, &mut out);
        assert_eq!(ctrl.position(), 7, "debounced retrigger must be ignored");

        for _ in 0..HOME_DEBOUNCE_TICKS {
            ctrl.decay_home_debounce();
        }
        ctrl.on_home_switch_triggered(&mut timer, &mut out);
        assert_eq!(ctrl.position(), 0, "after decay the switch is armed again");
    }
}
