//! State machine.

use crate::errors::Error;

/// Controller states, in wire code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DoorState {
    /// A target is set, decide whether the door has to move
    Active = 0,
    /// The door moves towards the target, watch for arrival
    Monitor = 1,
    /// A press was issued, wait for the door to start moving
    Start = 2,
    /// A press was issued, wait for the door to come to rest
    Stop = 3,
    /// At rest, only a new target leaves this state
    Idle = 4,
}

impl DoorState {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Active),
            1 => Ok(Self::Monitor),
            2 => Ok(Self::Start),
            3 => Ok(Self::Stop),
            4 => Ok(Self::Idle),
            other => Err(Error::InvalidStateCode(other)),
        }
    }

    /// Whether entering this state presses the opener button.
    pub fn is_command(self) -> bool {
        matches!(self, Self::Start | Self::Stop)
    }
}

/// Outcome of the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MoveResult {
    #[default]
    None = 0,
    Success = 1,
    /// The door did not behave as commanded and control was released
    Fail = 2,
}

impl MoveResult {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Success),
            2 => Ok(Self::Fail),
            other => Err(Error::InvalidResultCode(other)),
        }
    }
}
