//! Pulse Generator (C1): the two timer-ISR handlers.
//!
//! Grounded directly on `ISR(TCC0_OVF_vect)` and `ISR(TCC0_CCA_vect)` in
//! `stepper_motor.c`. The overflow ISR only ever copies the period the main
//! loop last computed into the timer's live registers; the compare-match
//! ISR is the one that actually advances position and notices arrival.

use core::sync::atomic::Ordering;

use crate::controller::MotionController;
use crate::hal::{PulseOutput, StepTimer};
use crate::registers::{home_steps_events, move_to_events};
use crate::status::Status;

impl MotionController {
    /// Timer overflow handler: latches the period computed by the last
    /// 500 µs tick into the timer. Called at every pulse-timer overflow,
    /// whether or not a step fires on this cycle.
    pub fn on_timer_overflow(&self, timer: &mut impl StepTimer) {
        let period = self.period_current.load(Ordering::Relaxed);
        timer.set_period(period);
    }

    /// Compare-match handler: fires one step, advances position by one in
    /// the direction of travel, and detects arrival at the target.
    ///
    /// Direction is recomputed on every pulse from current vs. target
    /// position (matching the original firmware's
    /// `(motor_current_position < motor_target_position) ? ++ : --`) even
    /// though the direction *pin* is only set once at move-start.
    pub fn on_pulse_compare(&self, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        pulse_out.pulse();

        let target = self.position_target.load(Ordering::Relaxed);
        let current = self.position_current.load(Ordering::Relaxed);
        let next = if current < target { current + 1 } else { current - 1 };
        self.position_current.store(next, Ordering::Relaxed);

        if next == target {
            self.stop_motion(timer, pulse_out);
        }
    }

    /// Halts the motor immediately: disables the timer-driven pulsing,
    /// resets the kinematic state to rest, and raises the appropriate
    /// completion event. Called both from normal arrival and from an
    /// emergency stop.
    pub fn stop_motion(&self, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        timer.stop();
        let was_homing = self.status() == Status::Homing;

        self.is_running.store(false, Ordering::Relaxed);
        crate::controller::store_f32(&self.velocity_current, 0.0);
        crate::controller::store_f32(&self.acceleration_current, 0.0);
        crate::controller::store_f32(&self.jerk_current, 0.0);
        self.braking_distance.store(0, Ordering::Relaxed);

        if was_homing {
            self.home_steps_events.raise(home_steps_events::HOMING_FAILED);
            self.homing_performed.store(false, Ordering::Relaxed);
        } else {
            self.move_to_events.raise(move_to_events::MOVE_SUCCESSFUL);
        }

        self.set_status(Status::Stopped);
        self.motor_stopped_event.raise();
        let _ = pulse_out;
    }

    /// Emergency stop: same immediate halt as [`Self::stop_motion`] but
    /// raised from a safety context, so it does not report a successful
    /// arrival even if the motor happened to be exactly at its target.
    pub fn emergency_stop(&self, timer: &mut impl StepTimer, pulse_out: &mut impl PulseOutput) {
        timer.stop();
        // The reset touches several independent atomics that together
        // describe "the motor is at rest"; a switch or pulse ISR reading
        // them mid-sequence should never see a torn combination, so the
        // whole reset runs with interrupts held off (matching the
        // `PMIC_CTRL` guard `stop_motor()` takes in the original firmware).
        critical_section::with(|_| {
            self.is_running.store(false, Ordering::Relaxed);
            crate::controller::store_f32(&self.velocity_current, 0.0);
            crate::controller::store_f32(&self.acceleration_current, 0.0);
            crate::controller::store_f32(&self.jerk_current, 0.0);
            self.braking_distance.store(0, Ordering::Relaxed);
        });

        if self.status() == Status::Homing {
            self.home_steps_events.raise(home_steps_events::HOMING_FAILED);
            self.homing_performed.store(false, Ordering::Relaxed);
        } else {
            self.move_to_events.raise(move_to_events::MOVE_ABORTED);
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
        period: Cell<u32>,
        running: Cell<bool>,
    }
    impl StepTimer for FakeTimer {
        fn set_period(&mut self, period_ticks: u32) {
            self.period.set(period_ticks);
        }
        fn start(&mut self, period_ticks: u32) {
            self.period.set(period_ticks);
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
        steps: u32,
        enabled: bool,
    }
    impl PulseOutput for FakePulseOutput {
        fn set_direction(&mut self, _forward: bool) {}
        fn pulse(&mut self) {
            self.steps += 1;
        }
        fn enable(&mut self) {
            self.enabled = true;
        }
        fn disable(&mut self) {
            self.enabled = false;
        }
    }

    #[test]
    fn compare_match_advances_toward_target_and_stops_on_arrival() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.position_target.store(3, Ordering::Relaxed);
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::ConstantVelocity);

        let mut timer = FakeTimer::default();
        timer.start(1);
        let mut out = FakePulseOutput::default();
        ctrl.on_pulse_compare(&mut timer, &mut out);
        assert_eq!(ctrl.position(), 1);
        assert!(ctrl.is_running());

        ctrl.on_pulse_compare(&mut timer, &mut out);
        ctrl.on_pulse_compare(&mut timer, &mut out);
        assert_eq!(ctrl.position(), 3);
        assert!(!ctrl.is_running());
        assert_eq!(ctrl.status(), Status::Stopped);
        assert_eq!(out.steps, 3);
        assert!(!timer.is_running(), "arrival must disable the pulse timer");
    }

    #[test]
    fn homing_arrival_without_switch_reports_failure() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.position_target.store(1, Ordering::Relaxed);
        ctrl.is_running.store(true, Ordering::Relaxed);
        ctrl.set_status(Status::Homing);
        ctrl.homing_performed.store(true, Ordering::Relaxed);

        let mut timer = FakeTimer::default();
        let mut out = FakePulseOutput::default();
        ctrl.on_pulse_compare(&mut timer, &mut out);

        assert_eq!(ctrl.home_steps_events.drain(), home_steps_events::HOMING_FAILED);
        assert!(!ctrl.has_homed());
    }

    #[test]
    fn overflow_handler_latches_the_current_period() {
        let ctrl = MotionController::new(MotionParameters::default());
        ctrl.period_current.store(500, Ordering::Relaxed);
        let mut timer = FakeTimer::default();
        ctrl.on_timer_overflow(&mut timer);
        assert_eq!(timer.period.get(), 500);
    }
}
