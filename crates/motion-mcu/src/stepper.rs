//! # Stepper Axis Glue
//!
//! Wires `motion_core::MotionController` to concrete MCU peripherals: a
//! hardware timer firing the overflow/compare-match pair C1 expects, and a
//! step/direction/enable output stage driven through `driver-pulse-output`.
//!
//! The controller itself is hardware-agnostic (see [`motion_core::hal`]); this
//! module is the thin adapter layer translating its trait calls into
//! register writes.

use core::cell::RefCell;
use critical_section::Mutex;
use driver_pulse_output::{Direction, PulseOutput as PulseOutputDriver};
use embedded_hal::digital::OutputPin;
use motion_core::{MotionController, PulseOutput, StepTimer};

/// Adapts `driver-pulse-output`'s step/direction/enable driver to the
/// [`motion_core::PulseOutput`] trait the controller is generic over.
pub struct PulseOutputAdapter<STEP, DIR, EN> {
    inner: PulseOutputDriver<STEP, DIR, EN>,
}

impl<STEP, DIR, EN, E> PulseOutputAdapter<STEP, DIR, EN>
where
    STEP: OutputPin<Error = E>,
    DIR: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
{
    pub fn new(step: STEP, dir: DIR, enable: EN) -> Self {
        Self { inner: PulseOutputDriver::new(step, dir, enable) }
    }
}

impl<STEP, DIR, EN, E> PulseOutput for PulseOutputAdapter<STEP, DIR, EN>
where
    STEP: OutputPin<Error = E>,
    DIR: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
{
    fn set_direction(&mut self, forward: bool) {
        let direction = if forward { Direction::Forward } else { Direction::Backward };
        let _ = self.inner.set_direction(direction);
    }

    fn pulse(&mut self) {
        let _ = self.inner.step();
    }

    fn enable(&mut self) {
        let _ = self.inner.enable();
    }

    fn disable(&mut self) {
        let _ = self.inner.disable();
    }
}

/// Adapts a raw timer peripheral's period register to
/// [`motion_core::StepTimer`]. `period_ticks` arrives in units of
/// `motion_core::config::TICK_RATE_HZ`; `REG` is whatever wrapper the board
/// init code produces for its pulse timer (an `embassy_stm32` low-level
/// timer handle on the Embassy build, an RTIC `CounterUs` on the RTIC
/// build), kept generic here so this adapter serves both runtimes.
pub trait RawPulseTimer {
    fn set_auto_reload(&mut self, ticks: u16);
    fn enable_counter(&mut self);
    fn disable_counter(&mut self);
}

pub struct HardwareStepTimer<REG: RawPulseTimer> {
    timer: REG,
    running: bool,
}

impl<REG: RawPulseTimer> HardwareStepTimer<REG> {
    pub fn new(timer: REG) -> Self {
        Self { timer, running: false }
    }
}

impl<REG: RawPulseTimer> StepTimer for HardwareStepTimer<REG> {
    fn set_period(&mut self, period_ticks: u32) {
        self.timer.set_auto_reload(period_ticks.min(u16::MAX as u32) as u16);
    }

    fn start(&mut self, period_ticks: u32) {
        self.set_period(period_ticks);
        self.timer.enable_counter();
        self.running = true;
    }

    fn stop(&mut self) {
        self.timer.disable_counter();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Polls the stop and home switches once per call and reports which ones
/// just transitioned into their triggered state, so the caller can invoke
/// `MotionController::on_stop_switch_triggered`/`on_home_switch_triggered`
/// on the edge rather than on every tick a switch stays held.
pub struct SwitchGroup<PIN> {
    endstops: driver_endstop::Endstops<2, PIN>,
    previous: [bool; 2],
}

impl<PIN, E> SwitchGroup<PIN>
where
    PIN: embedded_hal::digital::InputPin<Error = E>,
{
    pub const STOP: usize = 0;
    pub const HOME: usize = 1;

    pub fn new(stop_switch: PIN, home_switch: PIN) -> Self {
        Self { endstops: driver_endstop::Endstops::new([stop_switch, home_switch]), previous: [false; 2] }
    }

    /// Returns `(rising, falling)` edge masks against the previous poll.
    pub fn transitions(&mut self) -> ([bool; 2], [bool; 2]) {
        let now = self.endstops.read_states().unwrap_or(self.previous);
        let mut rising = [false; 2];
        let mut falling = [false; 2];
        for i in 0..2 {
            rising[i] = now[i] && !self.previous[i];
            falling[i] = !now[i] && self.previous[i];
        }
        self.previous = now;
        (rising, falling)
    }
}

/// The timer and pulse output bundled together because both the pulse ISR
/// (real-time, high frequency) and the switch-triggered abort path (the
/// 500 µs task, low frequency) need to reach both at once — `motion_core`'s
/// `on_*_switch_triggered` stops the timer and disables the output as one
/// step. Held behind a [`critical_section::Mutex`] so the two contexts never
/// tear each other's writes, the same guarantee `PMIC_CTRL` gave the
/// original interrupt-disable sections.
pub struct PulseContext<REG: RawPulseTimer, STEP, DIR, EN> {
    pub timer: HardwareStepTimer<REG>,
    pub pulse_out: PulseOutputAdapter<STEP, DIR, EN>,
}

/// The 500 µs integration tick, run as an Embassy task. Reaches the pulse
/// hardware only on a switch edge; every other tick it only touches the
/// controller's atomics and the switch inputs it owns outright.
#[cfg(feature = "embassy-rt")]
#[embassy_executor::task]
pub async fn integrator_task<REG, STEP, DIR, EN, SWPIN, W>(
    controller: &'static MotionController,
    pulse_ctx: &'static Mutex<RefCell<Option<PulseContext<REG, STEP, DIR, EN>>>>,
    mut switches: SwitchGroup<SWPIN>,
    mut watchdog: crate::safety::WatchdogSupervisor<W>,
) where
    REG: RawPulseTimer + 'static,
    STEP: embedded_hal::digital::OutputPin + 'static,
    DIR: embedded_hal::digital::OutputPin<Error = STEP::Error> + 'static,
    EN: embedded_hal::digital::OutputPin<Error = STEP::Error> + 'static,
    SWPIN: embedded_hal::digital::InputPin + 'static,
    W: crate::safety::RawWatchdog + 'static,
{
    let mut ticker = embassy_time::Ticker::every(embassy_time::Duration::from_micros(500));
    loop {
        let (rising, falling) = switches.transitions();
        let stop_edge = rising[SwitchGroup::<SWPIN>::STOP] || falling[SwitchGroup::<SWPIN>::STOP];
        if stop_edge || rising[SwitchGroup::<SWPIN>::HOME] {
            critical_section::with(|cs| {
                if let Some(ctx) = pulse_ctx.borrow(cs).borrow_mut().as_mut() {
                    if rising[SwitchGroup::<SWPIN>::STOP] {
                        controller.on_stop_switch_triggered(true, &mut ctx.timer, &mut ctx.pulse_out);
                    } else if falling[SwitchGroup::<SWPIN>::STOP] {
                        controller.on_stop_switch_triggered(false, &mut ctx.timer, &mut ctx.pulse_out);
                    }
                    if rising[SwitchGroup::<SWPIN>::HOME] {
                        controller.on_home_switch_triggered(&mut ctx.timer, &mut ctx.pulse_out);
                    }
                }
            });
        }
        controller.tick_500us();
        controller.decay_home_debounce();
        let tick_events = controller.drain_tick();
        if !tick_events.is_empty() {
            defmt::debug!("tick events: {}", tick_events);
        }
        watchdog.feed();
        ticker.next().await;
    }
}
