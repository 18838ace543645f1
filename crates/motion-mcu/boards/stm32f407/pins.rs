//! Pin assignments for a Nucleo-F407-style board wired to one stepper axis.
//!
//! Step/direction/enable drive a stepper driver IC; the stop switch is the
//! estop input, the home switch the homing limit switch. Both switches are
//! wired active-low with the MCU's internal pull-up enabled.

use embassy_stm32::gpio::{Input, Output, Level, Pull, Speed};
use embassy_stm32::Peripherals;

pub struct BoardPins<'a> {
    pub step: Output<'a>,
    pub dir: Output<'a>,
    pub enable: Output<'a>,
    pub stop_switch: Input<'a>,
    pub home_switch: Input<'a>,
    pub led: Output<'a>,
}

impl<'a> BoardPins<'a> {
    pub fn new(p: Peripherals) -> Self {
        Self {
            step: Output::new(p.PA0, Level::Low, Speed::VeryHigh),
            dir: Output::new(p.PA1, Level::Low, Speed::Low),
            enable: Output::new(p.PA2, Level::High, Speed::Low),
            stop_switch: Input::new(p.PB0, Pull::Up),
            home_switch: Input::new(p.PB1, Pull::Up),
            led: Output::new(p.PD12, Level::High, Speed::Low),
        }
    }
}
