#![no_std]
#![no_main]
#![cfg_attr(feature = "embassy-rt", feature(type_alias_impl_trait))]

use defmt_rtt as _; // global logger
use panic_probe as _;

#[cfg(feature = "embassy-rt")]
#[path = "../boards/mod.rs"]
pub mod boards;

pub mod safety;
pub mod stepper;

#[cfg(feature = "embassy-rt")]
mod embassy_main;
#[cfg(feature = "embassy-rt")]
use embassy_main as _;

#[cfg(feature = "rtic-rt")]
mod rtic_main;
#[cfg(feature = "rtic-rt")]
use rtic_main as _;
