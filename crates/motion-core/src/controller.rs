//! `MotionController`: the shared state every execution context (main
//! loop, pulse ISR, switch ISRs) touches.
//!
//! Every field is a fixed-width atomic: word-sized state shared between a
//! single writer context and readers favors atomics over a lock. `f32`
//! fields are stored as `AtomicU32` via `to_bits`/`from_bits`, since there
//! is no `AtomicF32` in `core`. Peripheral handles are a separate concern —
//! those need real interior mutability via `critical_section::Mutex<RefCell<_>>`,
//! but nothing here is a peripheral handle, so nothing uses one.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

use crate::events::{EventBits, EventFlag, TickEvents};
use crate::params::MotionParameters;
use crate::status::Status;

#[inline]
pub(crate) fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

#[inline]
pub(crate) fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed)
}

/// All state shared across the pulse ISR, the switch ISRs, and the 500 µs
/// main-loop tick. Construct one instance per motor axis.
pub struct MotionController {
    pub(crate) status: AtomicU8,
    pub(crate) position_current: AtomicI32,
    pub(crate) position_target: AtomicI32,
    pub(crate) direction_forward: AtomicBool,

    pub(crate) velocity_current: AtomicU32,
    pub(crate) acceleration_current: AtomicU32,
    pub(crate) jerk_current: AtomicU32,
    pub(crate) braking_distance: AtomicU32,
    pub(crate) period_current: AtomicU32,

    pub(crate) motor_enabled: AtomicBool,
    pub(crate) is_running: AtomicBool,

    pub(crate) homing_enabled: AtomicBool,
    pub(crate) homing_active: AtomicBool,
    pub(crate) homing_performed: AtomicBool,

    pub(crate) home_switch_debounce: AtomicU8,

    pub(crate) stop_switch_state: AtomicBool,
    pub(crate) stop_switch_dirty: AtomicBool,

    pub(crate) analog_enabled: AtomicBool,
    pub(crate) encoder_enabled: AtomicBool,
    pub(crate) encoder_reset_event: EventFlag,

    pub(crate) min_velocity: AtomicU32,
    pub(crate) max_velocity: AtomicU32,
    pub(crate) accel: AtomicU32,
    pub(crate) decel: AtomicU32,
    pub(crate) accel_jerk: AtomicU32,
    pub(crate) decel_jerk: AtomicU32,
    pub(crate) home_velocity: AtomicU32,

    pub(crate) motor_stopped_event: EventFlag,
    pub(crate) move_to_events: EventBits,
    pub(crate) home_steps_events: EventBits,
}

impl MotionController {
    pub fn new(params: MotionParameters) -> Self {
        Self {
            status: AtomicU8::new(Status::Stopped.encode()),
            position_current: AtomicI32::new(0),
            position_target: AtomicI32::new(0),
            direction_forward: AtomicBool::new(true),

            velocity_current: AtomicU32::new(0f32.to_bits()),
            acceleration_current: AtomicU32::new(0f32.to_bits()),
            jerk_current: AtomicU32::new(0f32.to_bits()),
            braking_distance: AtomicU32::new(0),
            period_current: AtomicU32::new(crate::config::PERIOD_MAX),

            motor_enabled: AtomicBool::new(false),
            is_running: AtomicBool::new(false),

            homing_enabled: AtomicBool::new(false),
            homing_active: AtomicBool::new(false),
            homing_performed: AtomicBool::new(false),

            home_switch_debounce: AtomicU8::new(0),

            stop_switch_state: AtomicBool::new(false),
            stop_switch_dirty: AtomicBool::new(false),

            analog_enabled: AtomicBool::new(false),
            encoder_enabled: AtomicBool::new(false),
            encoder_reset_event: EventFlag::new(),

            min_velocity: AtomicU32::new(params.v_min.to_bits()),
            max_velocity: AtomicU32::new(params.v_max.to_bits()),
            accel: AtomicU32::new(params.a_accel.to_bits()),
            decel: AtomicU32::new(params.a_decel.to_bits()),
            accel_jerk: AtomicU32::new(params.j_accel.to_bits()),
            decel_jerk: AtomicU32::new(params.j_decel.to_bits()),
            home_velocity: AtomicU32::new(params.v_home.to_bits()),

            motor_stopped_event: EventFlag::new(),
            move_to_events: EventBits::new(),
            home_steps_events: EventBits::new(),
        }
    }

    pub fn status(&self) -> Status {
        Status::decode(self.status.load(Ordering::Relaxed))
    }

    pub(crate) fn set_status(&self, status: Status) {
        self.status.store(status.encode(), Ordering::Relaxed);
    }

    pub fn position(&self) -> i32 {
        self.position_current.load(Ordering::Relaxed)
    }

    pub fn target(&self) -> i32 {
        self.position_target.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn is_motor_enabled(&self) -> bool {
        self.motor_enabled.load(Ordering::Relaxed)
    }

    pub fn set_motor_enabled(&self, enabled: bool) {
        self.motor_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_homing_enabled(&self) -> bool {
        self.homing_enabled.load(Ordering::Relaxed)
    }

    pub fn set_homing_enabled(&self, enabled: bool) {
        self.homing_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn has_homed(&self) -> bool {
        self.homing_performed.load(Ordering::Relaxed)
    }

    pub fn velocity(&self) -> f32 {
        load_f32(&self.velocity_current)
    }

    pub fn current_period(&self) -> u32 {
        self.period_current.load(Ordering::Relaxed)
    }

    /// Reads out the current tuning parameters as one coherent-ish snapshot.
    /// Fields are read independently (no cross-field atomicity guarantee),
    /// matching the original firmware's unsynchronized global reads — the
    /// dispatcher is the only writer, so tearing across fields never mixes
    /// two different writes to the *same* field.
    pub fn parameters(&self) -> MotionParameters {
        MotionParameters {
            v_min: load_f32(&self.min_velocity),
            v_max: load_f32(&self.max_velocity),
            a_accel: load_f32(&self.accel),
            a_decel: load_f32(&self.decel),
            j_accel: load_f32(&self.accel_jerk),
            j_decel: load_f32(&self.decel_jerk),
            v_home: load_f32(&self.home_velocity),
        }
    }

    pub(crate) fn store_parameters(&self, params: &MotionParameters) {
        store_f32(&self.min_velocity, params.v_min);
        store_f32(&self.max_velocity, params.v_max);
        store_f32(&self.accel, params.a_accel);
        store_f32(&self.decel, params.a_decel);
        store_f32(&self.accel_jerk, params.j_accel);
        store_f32(&self.decel_jerk, params.j_decel);
        store_f32(&self.home_velocity, params.v_home);
    }

    /// Drains the accumulated `MOVE_TO_EVENTS` bits (register 41), clearing
    /// them. Called once per 500 µs tick by the main loop when it pushes
    /// register updates out to the host.
    pub fn drain_move_to_events(&self) -> u8 {
        self.move_to_events.drain()
    }

    /// Drains the accumulated `HOME_STEPS_EVENTS` bits (register 49),
    /// clearing them.
    pub fn drain_home_steps_events(&self) -> u8 {
        self.home_steps_events.drain()
    }

    /// Returns `true` exactly once per motor-stopped notification, clearing
    /// it (`send_motor_stopped_notification` in the original firmware).
    pub fn take_motor_stopped_event(&self) -> bool {
        self.motor_stopped_event.take()
    }

    pub fn is_analog_enabled(&self) -> bool {
        self.analog_enabled.load(Ordering::Relaxed)
    }

    pub fn is_encoder_enabled(&self) -> bool {
        self.encoder_enabled.load(Ordering::Relaxed)
    }

    /// Returns `true` exactly once per `RESET_ENCODER` write, clearing it.
    pub fn take_encoder_reset_event(&self) -> bool {
        self.encoder_reset_event.take()
    }

    /// Drains every event source the main loop owns and bundles them into
    /// one report, so the host bus only has to inspect a single value per
    /// 500 µs tick instead of polling each register in turn. Matches
    /// `core_callback_t_before_exec`'s notification block in the original
    /// firmware, which walks the same set of flags every tick.
    pub fn drain_tick(&self) -> TickEvents {
        let home_step_events = self.drain_home_steps_events();
        let move_to_events = self.drain_move_to_events();
        let moving_cleared = self.take_motor_stopped_event();
        let stop_switch = if self.stop_switch_dirty.swap(false, Ordering::Relaxed) {
            Some(self.stop_switch_state.load(Ordering::Relaxed))
        } else {
            None
        };
        TickEvents { home_step_events, move_to_events, moving_cleared, stop_switch }
    }
}
