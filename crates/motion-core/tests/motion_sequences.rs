use motion_core::registers::{home_steps_events, move_to_events};
use motion_core::{MotionController, MotionParameters, PulseOutput, Status, StepTimer};

#[derive(Default)]
struct TestTimer {
    running: bool,
    period: u32,
}
impl StepTimer for TestTimer {
    fn set_period(&mut self, period_ticks: u32) {
        self.period = period_ticks;
    }
    fn start(&mut self, period_ticks: u32) {
        self.period = period_ticks;
        self.running = true;
    }
    fn stop(&mut self) {
        self.running = false;
    }
    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Default)]
struct TestPulseOutput {
    steps: u32,
    forward: Option<bool>,
    enabled: bool,
}
impl PulseOutput for TestPulseOutput {
    fn set_direction(&mut self, forward: bool) {
        self.forward = Some(forward);
    }
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

/// Runs the pulse ISR the number of times a move at `period` ticks would
/// fire in one 500 µs tick window, and then runs the tick itself — a coarse
/// stand-in for the real relationship between the 500 µs cadence and
/// however many step periods fit inside it.
fn run_until_stopped(ctrl: &MotionController, timer: &mut TestTimer, out: &mut TestPulseOutput, max_ticks: u32) {
    for _ in 0..max_ticks {
        if !ctrl.is_running() {
            return;
        }
        ctrl.tick_500us();
        ctrl.on_timer_overflow(timer);
        // However many pulses this period allows inside 500us, at least one.
        let pulses_this_tick = (500 / ctrl.current_period().max(1)).max(1);
        for _ in 0..pulses_this_tick {
            if !ctrl.is_running() {
                break;
            }
            ctrl.on_pulse_compare(timer, out);
        }
    }
}

#[test]
fn full_move_reaches_target_and_reports_success() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    ctrl.move_to(2000, &mut timer, &mut out).unwrap();
    assert_eq!(out.forward, Some(true));

    run_until_stopped(&ctrl, &mut timer, &mut out, 100_000);

    assert_eq!(ctrl.position(), 2000);
    assert_eq!(ctrl.status(), Status::Stopped);
    assert!(!ctrl.is_running());
    let events = ctrl.drain_move_to_events();
    assert_eq!(events, move_to_events::MOVE_SUCCESSFUL);
}

#[test]
fn move_refused_while_motor_disabled() {
    let ctrl = MotionController::new(MotionParameters::default());
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    assert!(ctrl.move_to(500, &mut timer, &mut out).is_err());
    assert_eq!(ctrl.drain_move_to_events(), move_to_events::MOTOR_DISABLED);
    assert!(!ctrl.is_running());
}

#[test]
fn emergency_stop_mid_move_aborts_and_disables_output() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();
    ctrl.move_to(1_000_000, &mut timer, &mut out).unwrap();

    ctrl.on_stop_switch_triggered(true, &mut timer, &mut out);

    assert!(!ctrl.is_running());
    assert!(!ctrl.is_motor_enabled());
    assert!(!out.enabled);
}

#[test]
fn homing_success_zeroes_position_and_clears_debounce_state() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    ctrl.set_homing_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    ctrl.start_homing(100_000, false, &mut timer, &mut out).unwrap();
    assert_eq!(ctrl.status(), Status::Homing);

    ctrl.on_home_switch_triggered(&mut timer, &mut out);

    assert_eq!(ctrl.position(), 0);
    assert!(ctrl.has_homed());
    assert_eq!(ctrl.drain_home_steps_events(), home_steps_events::HOMING_SUCCESSFUL);
    assert_eq!(ctrl.status(), Status::Stopped);
}

#[test]
fn homing_refused_without_control_enable() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    assert!(ctrl.start_homing(50_000, false, &mut timer, &mut out).is_err());
    assert_eq!(ctrl.status(), Status::Stopped);
}

#[test]
fn repeated_identical_move_to_is_idempotent() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    ctrl.move_to(2000, &mut timer, &mut out).unwrap();
    run_until_stopped(&ctrl, &mut timer, &mut out, 100_000);
    ctrl.drain_move_to_events();

    // Commanding the same position the motor already occupies is a no-op.
    ctrl.move_to(2000, &mut timer, &mut out).unwrap();
    assert!(!ctrl.is_running());
    assert_eq!(ctrl.status(), Status::Stopped);
}

#[test]
fn unexpected_home_trigger_mid_move_aborts_it() {
    let ctrl = MotionController::new(MotionParameters::default());
    ctrl.set_motor_enabled(true);
    ctrl.set_homing_enabled(true);
    let mut timer = TestTimer::default();
    let mut out = TestPulseOutput::default();

    ctrl.move_to(1_000_000, &mut timer, &mut out).unwrap();
    assert_eq!(ctrl.status(), Status::Accelerating);

    ctrl.on_home_switch_triggered(&mut timer, &mut out);

    assert_eq!(ctrl.drain_home_steps_events(), home_steps_events::UNEXPECTED_HOME);
    assert_eq!(ctrl.drain_move_to_events(), move_to_events::MOVE_ABORTED);
    assert_eq!(ctrl.position(), 0);
    assert!(!ctrl.is_running());
}
