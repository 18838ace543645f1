//! Hardware-facing traits the pulse generator is built against.
//!
//! `motion-core` itself never touches a register. It is generic over these
//! traits the way `mcu_drivers`'s drivers are generic over `embedded_hal`
//! pins, so the same integration and pulse logic runs unmodified on the
//! target MCU and against a host-side fake in tests.

/// The hardware timer driving the step pulse ISRs.
///
/// `set_period` is called from the overflow ISR (C1, "pulse timer overflow
/// handler") to latch in the period computed by the last 500 µs tick, and
/// `stop` powers the timer down entirely once a move completes.
pub trait StepTimer {
    /// Programs the timer's next period, in ticks of [`crate::config::TICK_RATE_HZ`].
    fn set_period(&mut self, period_ticks: u32);
    /// Starts the timer running at `period_ticks` if it isn't already.
    fn start(&mut self, period_ticks: u32);
    /// Stops the timer, halting pulse generation.
    fn stop(&mut self);
    /// `true` if the timer is currently counting.
    fn is_running(&self) -> bool;
}

/// The step/direction/enable output stage pulsed from the compare-match ISR.
pub trait PulseOutput {
    /// Sets the direction pin. Called once at move-start; direction stays
    /// fixed for the duration of one move.
    fn set_direction(&mut self, forward: bool);
    /// Emits one step pulse.
    fn pulse(&mut self);
    fn enable(&mut self);
    fn disable(&mut self);
}

/// A debounced digital input, used for both the stop switch and the home
/// switch. The implementation owns the raw GPIO read; this core only needs
/// the already-debounced level.
pub trait DigitalInput {
    /// `true` when the switch is in its triggered state.
    fn is_triggered(&mut self) -> bool;
}
