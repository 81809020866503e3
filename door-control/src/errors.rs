//! Error handling.

use core::fmt;

/// All possible error types
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error {
    /// Output buffer cannot hold a snapshot
    BufferTooSmall,
    /// Snapshot does not start with the door identifier
    InvalidIdentifier(u8),
    InvalidStateCode(u8),
    InvalidResultCode(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("Snapshot: buffer too small"),
            Self::InvalidIdentifier(id) => write!(f, "Snapshot: invalid identifier 0x{:02x}", id),
            Self::InvalidStateCode(code) => write!(f, "Snapshot: invalid state code {}", code),
            Self::InvalidResultCode(code) => write!(f, "Snapshot: invalid result code {}", code),
        }
    }
}

impl core::error::Error for Error {}
