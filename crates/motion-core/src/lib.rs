//! # motion-core
//!
//! A deterministic single-axis stepper motion core, usable on both host and
//! MCU (`no_std`-friendly). It owns the jerk-limited trapezoidal velocity
//! profile, the pulse-timer ISR logic, the braking estimator, the home- and
//! stop-switch safety handling, and the register-bank command dispatcher —
//! everything a firmware target needs to drive one stepper axis, minus the
//! concrete timer/GPIO peripherals and the host wire protocol, which are
//! supplied by the embedding firmware crate through the traits in [`hal`].

#![cfg_attr(not(feature = "std"), no_std)]

pub mod braking;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod events;
pub mod hal;
pub mod integrator;
pub mod machine;
mod mathutil;
pub mod params;
pub mod pulse;
pub mod registers;
pub mod safety;
pub mod status;

pub use controller::MotionController;
pub use dispatch::DispatchError;
pub use events::TickEvents;
pub use hal::{DigitalInput, PulseOutput, StepTimer};
pub use params::MotionParameters;
pub use status::Status;
