//! Garage door control through a single momentary relay.
//!
//! The opener only understands "button pressed", so the controller infers
//! direction and arrival from a continuous position sensor. See
//! [`DoorController`] for the state machine.
#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod controller;
pub mod errors;
pub mod position;
pub mod relay;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod snapshot;
pub mod states;

pub use clock::Clock;
pub use controller::{DoorController, Tick};
pub use errors::Error;
pub use position::{PositionBounds, PositionSensor};
pub use relay::{Relay, RelayPin};
pub use snapshot::Snapshot;
pub use states::{DoorState, MoveResult};
