//! Hardware- and tuning-constants for the motion core.
//!
//! Collected in one place rather than scattered across the modules that
//! consume them, the same way board pin assignments live in one file and a
//! fixed-point scale factor lives in one constant.

/// Lower bound on commandable velocity, in steps/s. The stepper driver
/// cannot reliably pulse slower than this without losing torque predictability.
pub const V_HW_MIN: u16 = 16;
/// Upper bound on commandable velocity, in steps/s, set by the pulse timer's
/// minimum period.
pub const V_HW_MAX: u16 = 20_000;

/// The pulse timer's tick rate. `period_current` is expressed in ticks of
/// this clock, matching the original firmware's choice of microsecond
/// step periods (`1_000_000 / velocity`).
pub const TICK_RATE_HZ: u32 = 1_000_000;

/// Shortest legal step period, derived from [`V_HW_MAX`].
pub const PERIOD_MIN: u32 = TICK_RATE_HZ / V_HW_MAX as u32;
/// Longest legal step period, derived from [`V_HW_MIN`].
pub const PERIOD_MAX: u32 = TICK_RATE_HZ / V_HW_MIN as u32;

/// The cadence at which the main loop re-integrates velocity/acceleration.
pub const TICK_SECONDS: f32 = 0.0005;

/// Home-switch debounce hold-off, expressed in 500 µs ticks (10 ms).
pub const HOME_DEBOUNCE_TICKS: u8 = 20;

/// Empirical coefficient for the over-brake velocity correction applied
/// while decelerating past the estimated braking distance. Tuned on the
/// original hardware; see `integrator::apply_over_brake_correction`.
pub const OVER_BRAKE_COEFFICIENT: f32 = 0.125;
