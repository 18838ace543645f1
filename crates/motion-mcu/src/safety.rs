//! # Safety Supervisor Glue
//!
//! Runs the independent hardware watchdog alongside the motion controller.
//! The watchdog itself is orthogonal to the stop/home switch handling (that
//! lives on `motion_core::MotionController` directly, called from the
//! board's GPIO interrupt bindings in `embassy_main`/`rtic_main`) — this
//! module exists so a hung tick task resets the MCU rather than leaving a
//! motor spinning with nobody left to stop it.
//!
//! `RawWatchdog` is kept generic over the concrete peripheral handle for the
//! same reason `stepper::RawPulseTimer` is: the Embassy build feeds an
//! `embassy_stm32::wdg::IndependentWatchdog`, the RTIC build feeds an
//! `stm32f4xx_hal` equivalent, and this module shouldn't need to know which.

/// A watchdog timer that must be fed periodically or the MCU resets.
pub trait RawWatchdog {
    fn unleash(&mut self);
    fn feed(&mut self);
}

/// Feeds `watchdog` once per call; intended to be driven from the same
/// 500 µs cadence as [`crate::stepper::integrator_task`] so a wedged
/// integrator tick starves the feed and trips the reset.
pub struct WatchdogSupervisor<W: RawWatchdog> {
    watchdog: W,
}

impl<W: RawWatchdog> WatchdogSupervisor<W> {
    pub fn new(mut watchdog: W) -> Self {
        watchdog.unleash();
        Self { watchdog }
    }

    #[inline]
    pub fn feed(&mut self) {
        self.watchdog.feed();
    }
}
