//! Event Bus Adapter (C7).
//!
//! Event bitmasks are filled by any context (main loop, pulse ISR, switch
//! ISR) and drained on the 500 µs cadence. Accumulation is bit-or, so a
//! reader that polls slower than events fire still sees every outcome that
//! happened in between, not just the latest.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A lock-free accumulator for an 8-bit event bitmask.
///
/// `raise` may be called from any context; `drain` is called once per
/// 500 µs tick from the main loop and returns the accumulated bits (0 if
/// nothing happened since the last drain), clearing them atomically.
#[derive(Default)]
pub struct EventBits(AtomicU8);

impl EventBits {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    #[inline]
    pub fn raise(&self, bits: u8) {
        self.0.fetch_or(bits, Ordering::Relaxed);
    }

    /// Returns the accumulated bits and clears them. `0` means "nothing to
    /// emit this tick".
    #[inline]
    pub fn drain(&self) -> u8 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A single-writer/single-reader "something happened" flag, used for
/// `request_stopped_event`. Overwrite semantics: repeated raises before a
/// drain collapse to one pending notification.
#[derive(Default)]
pub struct EventFlag(AtomicBool);

impl EventFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` exactly once per raise, clearing the flag.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// What the main loop should tell the host bus to emit after a `drain_tick`.
/// Mirrors §4.7: home-step events, move-to events, the `MOVING` register
/// transition, plus passthrough encoder/analog forwarding flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub struct TickEvents {
    pub home_step_events: u8,
    pub move_to_events: u8,
    pub moving_cleared: bool,
    /// `Some(level)` when the `STOP_SWITCH` register (addr 35) changed level
    /// since the last drain; `None` if it held steady.
    pub stop_switch: Option<bool>,
}

impl TickEvents {
    pub const fn is_empty(&self) -> bool {
        self.home_step_events == 0 && self.move_to_events == 0 && !self.moving_cleared && self.stop_switch.is_none()
    }
}
