//! The motion state machine's tagged status enumeration (C4).

/// The five states a move can be in. `Stopped` is both the initial and the
/// terminal state of every move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    Stopped = 0,
    Accelerating = 1,
    ConstantVelocity = 2,
    Decelerating = 3,
    Homing = 4,
}

impl Status {
    /// Decodes a status previously encoded with [`Status::encode`].
    ///
    /// Any out-of-range byte (which should never happen given the encoder
    /// is the only writer) decodes to `Stopped`, the safe default.
    pub const fn decode(raw: u8) -> Self {
        match raw {
            1 => Status::Accelerating,
            2 => Status::ConstantVelocity,
            3 => Status::Decelerating,
            4 => Status::Homing,
            _ => Status::Stopped,
        }
    }

    pub const fn encode(self) -> u8 {
        self as u8
    }

    /// `true` for every state in which the pulse timer is expected to be
    /// enabled.
    pub const fn is_running(self) -> bool {
        !matches!(self, Status::Stopped)
    }
}
