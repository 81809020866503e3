//! Fixed layout door status snapshot.
//!
//! `[identifier, position 0..=100, state code, result code]`

use crate::errors::Error;
use crate::states::{DoorState, MoveResult};

/// First byte of every door snapshot
pub const DOOR_IDENTIFIER: u8 = 0b1000_0000;

/// Encoded snapshot length in bytes
pub const SNAPSHOT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Door position in percent of the calibrated range
    pub position: u8,
    pub state: DoorState,
    pub result: MoveResult,
}

impl Snapshot {
    pub fn to_bytes(&self) -> [u8; SNAPSHOT_SIZE] {
        [
            DOOR_IDENTIFIER,
            self.position,
            self.state.code(),
            self.result.code(),
        ]
    }

    /// Write the snapshot to the start of `buf` and return the number of bytes written.
    ///
    /// The buffer is left untouched if it is too small.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let out = buf
            .get_mut(..SNAPSHOT_SIZE)
            .ok_or(Error::BufferTooSmall)?;
        out.copy_from_slice(&self.to_bytes());
        Ok(SNAPSHOT_SIZE)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        match *bytes {
            [DOOR_IDENTIFIER, position, state, result, ..] => Ok(Self {
                position,
                state: DoorState::from_code(state)?,
                result: MoveResult::from_code(result)?,
            }),
            [identifier, _, _, _, ..] => Err(Error::InvalidIdentifier(identifier)),
            _ => Err(Error::BufferTooSmall),
        }
    }
}
