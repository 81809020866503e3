//! Simulated single-button garage door opener.
//!
//! Runs the controller against a deterministic door model on the host. The
//! model follows the usual opener behaviour: a press while at rest moves the
//! door opposite to its previous travel, a press while moving stops it, and the
//! limit switches stop it at either end.

use core::cell::{Cell, Ref, RefCell, RefMut};

use crate::clock::Clock;
use crate::controller::{DoorController, Tick};
use crate::position::{PositionBounds, PositionSensor};
use crate::relay::Relay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher readings
    Opening,
    /// Towards lower readings
    Closing,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Opening => Self::Closing,
            Self::Closing => Self::Opening,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Stopped,
    Moving(Direction),
}

#[derive(Debug, Clone)]
pub struct DoorModel {
    /// Position in thousandths of a raw unit
    position: i32,
    motion: Motion,
    /// Where the next press from rest sends the door
    next_direction: Direction,
    closed_limit: i16,
    open_limit: i16,
    /// Raw units per second
    speed: i32,
    noise: i16,
    reads: u32,
    presses: u32,
    miss_press: bool,
    relay_high: bool,
}

impl DoorModel {
    /// A door at rest between its limit switches. The next press opens it.
    pub fn new(position: i16, closed_limit: i16, open_limit: i16, speed: u16) -> Self {
        let position = position.clamp(closed_limit, open_limit);
        Self {
            position: i32::from(position) * 1000,
            motion: Motion::Stopped,
            next_direction: Direction::Opening,
            closed_limit,
            open_limit,
            speed: i32::from(speed),
            noise: 0,
            reads: 0,
            presses: 0,
            miss_press: false,
            relay_high: false,
        }
    }

    /// Add `noise` units of alternating jitter to every reading.
    pub fn with_noise(mut self, noise: i16) -> Self {
        self.noise = noise;
        self
    }

    /// Set the direction of the next press from rest.
    pub fn heading(mut self, direction: Direction) -> Self {
        self.next_direction = direction;
        self
    }

    /// True position in raw units, without noise.
    pub fn position(&self) -> i16 {
        (self.position / 1000) as i16
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Number of button presses, by relay or by hand.
    pub fn presses(&self) -> u32 {
        self.presses
    }

    pub fn relay_high(&self) -> bool {
        self.relay_high
    }

    /// Resting on the limit switch the door stops at when moving in `direction`.
    pub fn at_limit(&self, direction: Direction) -> bool {
        let limit = match direction {
            Direction::Opening => self.open_limit,
            Direction::Closing => self.closed_limit,
        };
        self.motion == Motion::Stopped && self.position == i32::from(limit) * 1000
    }

    /// The opener does not react to the next press, e.g. a missed radio signal.
    pub fn miss_next_press(&mut self) {
        self.miss_press = true;
    }

    /// Press the opener button.
    pub fn press(&mut self) {
        self.presses += 1;
        if core::mem::take(&mut self.miss_press) {
            return;
        }
        self.motion = match self.motion {
            Motion::Stopped => Motion::Moving(self.next_direction),
            Motion::Moving(direction) => {
                self.next_direction = direction.reversed();
                Motion::Stopped
            }
        };
    }

    /// The opener reverses on its own, e.g. after hitting an obstruction.
    pub fn reverse(&mut self) {
        if let Motion::Moving(direction) = self.motion {
            self.motion = Motion::Moving(direction.reversed());
        }
    }

    /// The door stops on its own without reversing.
    pub fn jam(&mut self) {
        if let Motion::Moving(direction) = self.motion {
            self.next_direction = direction.reversed();
            self.motion = Motion::Stopped;
        }
    }

    /// Let `elapsed_ms` pass.
    pub fn advance(&mut self, elapsed_ms: u32) {
        let Motion::Moving(direction) = self.motion else {
            return;
        };
        let step = self
            .speed
            .saturating_mul(i32::try_from(elapsed_ms).unwrap_or(i32::MAX));
        let (position, limit) = match direction {
            Direction::Opening => {
                let limit = i32::from(self.open_limit) * 1000;
                let position = self.position.saturating_add(step);
                (position.min(limit), position >= limit)
            }
            Direction::Closing => {
                let limit = i32::from(self.closed_limit) * 1000;
                let position = self.position.saturating_sub(step);
                (position.max(limit), position <= limit)
            }
        };
        self.position = position;
        if limit {
            self.motion = Motion::Stopped;
            self.next_direction = direction.reversed();
        }
    }

    fn read(&mut self) -> i16 {
        self.reads = self.reads.wrapping_add(1);
        let jitter = if self.reads % 2 == 0 {
            self.noise
        } else {
            -self.noise
        };
        self.position().saturating_add(jitter)
    }

    fn drive_relay(&mut self, high: bool) {
        if high && !self.relay_high {
            self.press();
        }
        self.relay_high = high;
    }
}

pub struct SimSensor<'a> {
    model: &'a RefCell<DoorModel>,
}

impl<'a> SimSensor<'a> {
    pub fn new(model: &'a RefCell<DoorModel>) -> Self {
        Self { model }
    }
}

impl PositionSensor for SimSensor<'_> {
    fn read_position(&mut self) -> i16 {
        self.model.borrow_mut().read()
    }
}

/// Relay wired to the model's button. A rising edge is a press.
pub struct SimRelay<'a> {
    model: &'a RefCell<DoorModel>,
}

impl<'a> SimRelay<'a> {
    pub fn new(model: &'a RefCell<DoorModel>) -> Self {
        Self { model }
    }
}

impl Relay for SimRelay<'_> {
    fn set_relay(&mut self, high: bool) {
        self.model.borrow_mut().drive_relay(high);
    }
}

pub struct SimClock<'a> {
    now: &'a Cell<u32>,
}

impl<'a> SimClock<'a> {
    pub fn new(now: &'a Cell<u32>) -> Self {
        Self { now }
    }
}

impl Clock for SimClock<'_> {
    fn now_millis(&self) -> u32 {
        self.now.get()
    }
}

pub type SimController<'a> = DoorController<SimSensor<'a>, SimRelay<'a>, SimClock<'a>>;

/// A controller wired to a door model, stepped in 1 ms increments.
pub struct Bench<'a> {
    pub door: SimController<'a>,
    model: &'a RefCell<DoorModel>,
    clock: &'a Cell<u32>,
}

impl<'a> Bench<'a> {
    pub fn new(model: &'a RefCell<DoorModel>, clock: &'a Cell<u32>, bounds: PositionBounds) -> Self {
        let door = DoorController::new(
            SimSensor::new(model),
            SimRelay::new(model),
            SimClock::new(clock),
            bounds,
        );
        Self { door, model, clock }
    }

    /// Do not hold the returned borrow across a step.
    pub fn model(&self) -> Ref<'_, DoorModel> {
        self.model.borrow()
    }

    pub fn model_mut(&self) -> RefMut<'_, DoorModel> {
        self.model.borrow_mut()
    }

    pub fn now(&self) -> u32 {
        self.clock.get()
    }

    /// Advance time by 1 ms and run one control tick.
    pub fn step(&mut self) -> Tick {
        self.clock.set(self.clock.get().wrapping_add(1));
        self.model.borrow_mut().advance(1);
        self.door.execute()
    }

    pub fn run_for(&mut self, ms: u32) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Step until `done` holds, for at most `timeout_ms`. Returns whether it did.
    pub fn run_until<F>(&mut self, timeout_ms: u32, mut done: F) -> bool
    where
        F: FnMut(&SimController<'a>) -> bool,
    {
        for _ in 0..timeout_ms {
            self.step();
            if done(&self.door) {
                return true;
            }
        }
        false
    }
}
