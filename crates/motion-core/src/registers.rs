//! Register bank addresses and event bit constants.
//!
//! This module only defines the *contract* the host register/event bus
//! exchanges with the motion core. Framing, transport, and the byte-level
//! protocol are owned by an external collaborator, kept as a separate
//! concern the same way a wire-protocol crate stays separate from the
//! firmware that embeds it — not modeled here because this core does not
//! own a transport.

/// Register addresses, matching the host protocol's numbering.
pub mod addr {
    pub const CONTROL: u8 = 32;
    pub const ENCODER: u8 = 33;
    pub const ANALOG_INPUT: u8 = 34;
    pub const STOP_SWITCH: u8 = 35;
    pub const MOTOR_BRAKE: u8 = 36;
    pub const MOVING: u8 = 37;
    pub const STOP_MOVEMENT: u8 = 38;
    pub const DIRECT_VELOCITY: u8 = 39;
    pub const MOVE_TO: u8 = 40;
    pub const MOVE_TO_EVENTS: u8 = 41;
    pub const MIN_VELOCITY: u8 = 42;
    pub const MAX_VELOCITY: u8 = 43;
    pub const ACCELERATION: u8 = 44;
    pub const DECELERATION: u8 = 45;
    pub const ACCELERATION_JERK: u8 = 46;
    pub const DECELERATION_JERK: u8 = 47;
    pub const HOME_STEPS: u8 = 48;
    pub const HOME_STEPS_EVENTS: u8 = 49;
    pub const HOME_VELOCITY: u8 = 50;
    pub const HOME_SWITCH: u8 = 51;
}

/// Bits of the `CONTROL` register (addr 32).
pub mod control_bits {
    pub const ENABLE_MOTOR: u16 = 1 << 0;
    pub const DISABLE_MOTOR: u16 = 1 << 1;
    pub const ENABLE_ANALOG: u16 = 1 << 2;
    pub const DISABLE_ANALOG: u16 = 1 << 3;
    pub const ENABLE_ENCODER: u16 = 1 << 4;
    pub const DISABLE_ENCODER: u16 = 1 << 5;
    pub const ENABLE_HOMING: u16 = 1 << 6;
    pub const DISABLE_HOMING: u16 = 1 << 7;
    pub const RESET_ENCODER: u16 = 1 << 8;
}

/// Bits of `MOVE_TO_EVENTS` (addr 41).
pub mod move_to_events {
    pub const MOVE_SUCCESSFUL: u8 = 1 << 0;
    pub const MOVE_ABORTED: u8 = 1 << 1;
    pub const INVALID_POSITION: u8 = 1 << 2;
    pub const HOMING_MISSING: u8 = 1 << 3;
    pub const CURRENTLY_HOMING: u8 = 1 << 4;
    pub const MOTOR_DISABLED: u8 = 1 << 5;
    pub const INVALID_PARAMETERS: u8 = 1 << 6;
}

/// Bits of `HOME_STEPS_EVENTS` (addr 49).
pub mod home_steps_events {
    pub const HOMING_SUCCESSFUL: u8 = 1 << 0;
    pub const HOMING_FAILED: u8 = 1 << 1;
    pub const ALREADY_HOME: u8 = 1 << 2;
    pub const UNEXPECTED_HOME: u8 = 1 << 3;
    pub const HOMING_DISABLED: u8 = 1 << 4;
    pub const MOTOR_DISABLED: u8 = 1 << 5;
}

/// A parametric move-to transaction: seven `i32` fields written atomically.
/// `[target, v_min, v_max, a_accel, a_decel, j_accel, j_decel]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ParametricMoveTo {
    pub target: i32,
    pub v_min: i32,
    pub v_max: i32,
    pub a_accel: i32,
    pub a_decel: i32,
    pub j_accel: i32,
    pub j_decel: i32,
}
