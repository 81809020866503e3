//! Door control state machine.
//!
//! The opener is driven by a relay wired in parallel to its push button. A
//! press while the door rests moves it opposite to its previous travel, a
//! press while it moves stops it. The controller never knows which way a press
//! will send the door, so everything is derived from the sampled position:
//!
//! - `Active`: a target is set. Nothing to do if the door is already inside
//!   the target band, otherwise press and go to `Start`.
//! - `Start`: wait for the door to move. Motion towards the target goes to
//!   `Monitor`, motion the wrong way (or none at all once the command delay
//!   expired) goes back to `Active` for another press.
//! - `Monitor`: the door travels towards the target. Arrival presses again to
//!   stop it (`Stop`), unless the target is a bound, where the opener's limit
//!   switch stops the motor (`Idle`). A door that reverses or stalls makes
//!   the controller release control (`Idle` with [`MoveResult::Fail`]).
//! - `Stop`: wait for the door to come to rest, then re-check in `Active`.
//! - `Idle`: at rest until [`DoorController::set_target`] is called.

use crate::clock::{self, Clock};
use crate::errors::Error;
use crate::position::{PositionBounds, PositionSensor};
use crate::relay::Relay;
use crate::snapshot::Snapshot;
use crate::states::{DoorState, MoveResult};

/// Relay pulse length, in ms
pub const RELAY_DELAY: u32 = 100;

/// Minimum time between two position samples, in ms
pub const DOOR_SAMPLE_RATE: u32 = 35;

/// Time a press is given to show an effect before it is retried, in ms
pub const DOOR_COMMAND_DELAY: u32 = 1250;

/// Smoothed deltas above this magnitude count as motion
pub const DELTA_THRESHOLD: i8 = 1;

/// Half width of the target band, in raw units
pub const DOOR_THRESHOLD: i16 = 35;

/// Consecutive moving samples before a start is trusted
pub const START_STABILIZE_COUNT: u8 = 4;

/// Consecutive still samples before a stop is trusted
pub const STOP_STABILIZE_COUNT: u8 = 8;

/// Consecutive still samples after which a monitored move counts as stalled
pub const STALL_STABILIZE_COUNT: u8 = 8;

/// What a single [`DoorController::execute`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The sample gate was closed, nothing was evaluated
    NotSampled,
    /// The state machine changed state
    Transition { from: DoorState, to: DoorState },
    /// Sampled without state change, the door moves
    Moving,
    /// Sampled without state change, the door rests
    Still,
}

impl Tick {
    /// `0` when nothing was sampled or the door rests, `1` otherwise.
    pub fn motion_flag(self) -> u8 {
        match self {
            Self::NotSampled | Self::Still => 0,
            Self::Transition { .. } | Self::Moving => 1,
        }
    }
}

pub struct DoorController<S, R, C> {
    sensor: S,
    relay: R,
    clock: C,
    current_state: DoorState,
    desired_state: DoorState,
    result: MoveResult,
    current_position: i16,
    desired_position: i16,
    bounds: PositionBounds,
    /// Two point running average of the position delta between samples
    mean_position_delta: i8,
    relay_output: bool,
    /// Next time a sample may be taken
    time_stamp: u32,
    /// Before this time, a press is still expected to take effect
    command_time: u32,
    /// Time the relay pulse ends
    relay_time: u32,
    stabilize_count: u8,
}

impl<S, R, C> DoorController<S, R, C>
where
    S: PositionSensor,
    R: Relay,
    C: Clock,
{
    /// Take over the door at its current position. The relay is released.
    pub fn new(mut sensor: S, mut relay: R, clock: C, bounds: PositionBounds) -> Self {
        relay.set_relay(false);
        let position = sensor.read_position();
        let now = clock.now_millis();
        Self {
            sensor,
            relay,
            clock,
            current_state: DoorState::Idle,
            desired_state: DoorState::Idle,
            result: MoveResult::None,
            current_position: position,
            desired_position: position,
            bounds,
            mean_position_delta: 0,
            relay_output: false,
            time_stamp: now,
            command_time: now,
            relay_time: now,
            stabilize_count: 0,
        }
    }

    /// Move the door to `percent` (0 = closed bound, 100 = open bound).
    ///
    /// Supersedes a move in progress from the next sample on.
    pub fn set_target(&mut self, percent: u8) {
        self.desired_position = self.bounds.to_raw(percent);
        self.desired_state = DoorState::Active;
        self.result = MoveResult::None;
        log::debug!(
            "New target {}% (raw {})",
            percent.min(100),
            self.desired_position
        );
    }

    /// Use the current position as the closed bound, moved inwards by the
    /// target band so that a move never ends at the limit switch.
    pub fn calibrate_min(&mut self) -> i16 {
        let min = self.current_position.saturating_add(DOOR_THRESHOLD);
        self.bounds.set_min(min);
        log::info!("Calibrated closed position: {}", min);
        min
    }

    /// Use the current position as the open bound, see [`Self::calibrate_min`].
    pub fn calibrate_max(&mut self) -> i16 {
        let max = self.current_position.saturating_sub(DOOR_THRESHOLD);
        self.bounds.set_max(max);
        log::info!("Calibrated open position: {}", max);
        max
    }

    /// Run one control tick. Never blocks; call it at least every
    /// [`DOOR_SAMPLE_RATE`] ms.
    pub fn execute(&mut self) -> Tick {
        let now = self.clock.now_millis();

        if self.relay_output && clock::reached(now, self.relay_time) {
            self.drive_relay(false);
        }

        if !clock::reached(now, self.time_stamp) {
            return Tick::NotSampled;
        }
        self.time_stamp = now.wrapping_add(DOOR_SAMPLE_RATE);

        let raw = self.sensor.read_position();
        let difference = i32::from(self.current_position) - i32::from(raw);
        let is_moving = !(-DELTA_THRESHOLD..=DELTA_THRESHOLD).contains(&self.mean_position_delta);
        self.mean_position_delta = smooth(self.mean_position_delta, difference);

        // A target set since the last sample wins over the running move
        if self.desired_state == self.current_state {
            self.evaluate(now, is_moving);
        }

        self.current_position = raw;

        if self.desired_state != self.current_state {
            let from = self.current_state;
            let to = self.desired_state;
            if to.is_command() {
                self.press(now, to);
            }
            self.current_state = to;
            log::debug!("State transition: {:?} -> {:?}", from, to);
            return Tick::Transition { from, to };
        }

        if is_moving {
            Tick::Moving
        } else {
            Tick::Still
        }
    }

    fn evaluate(&mut self, now: u32, is_moving: bool) {
        match self.current_state {
            DoorState::Start => {
                if is_moving {
                    self.stabilize_count = self.stabilize_count.saturating_sub(1);
                    if self.stabilize_count == 0 {
                        if self.heading_to_target() {
                            self.stabilize_count = STALL_STABILIZE_COUNT;
                            self.desired_state = DoorState::Monitor;
                        } else {
                            log::debug!("Door started in the wrong direction");
                            self.desired_state = DoorState::Active;
                        }
                    }
                } else {
                    self.stabilize_count = START_STABILIZE_COUNT;
                    if clock::reached(now, self.command_time) {
                        self.desired_state = DoorState::Active;
                    }
                }
            }
            DoorState::Stop => {
                if is_moving {
                    self.stabilize_count = STOP_STABILIZE_COUNT;
                } else {
                    self.stabilize_count = self.stabilize_count.saturating_sub(1);
                    if self.stabilize_count == 0 {
                        self.desired_state = DoorState::Active;
                    }
                }
            }
            DoorState::Monitor => {
                if self.in_target_band() {
                    // At a bound the limit switch stops the motor, another press would reverse it
                    self.desired_state = if self.bounds.is_interior(self.desired_position) {
                        DoorState::Stop
                    } else {
                        DoorState::Idle
                    };
                    self.result = MoveResult::Success;
                } else if self.heading_away_from_target() {
                    log::warn!(
                        "Door moves away from target at {}, releasing control",
                        self.current_position
                    );
                    self.desired_state = DoorState::Idle;
                    self.result = MoveResult::Fail;
                } else if is_moving {
                    self.stabilize_count = STALL_STABILIZE_COUNT;
                } else {
                    self.stabilize_count = self.stabilize_count.saturating_sub(1);
                    if self.stabilize_count == 0 {
                        log::warn!(
                            "Door stalled at {}, releasing control",
                            self.current_position
                        );
                        self.desired_state = DoorState::Idle;
                        self.result = MoveResult::Fail;
                    }
                }
            }
            DoorState::Active => {
                self.desired_state = if self.in_target_band() {
                    DoorState::Idle
                } else {
                    DoorState::Start
                };
            }
            DoorState::Idle => {}
        }
    }

    /// A positive delta means the position decreases.
    fn heading_to_target(&self) -> bool {
        (self.mean_position_delta < 0 && self.current_position < self.desired_position)
            || (self.mean_position_delta > 0 && self.current_position > self.desired_position)
    }

    fn heading_away_from_target(&self) -> bool {
        (self.mean_position_delta > 0 && self.current_position < self.desired_position)
            || (self.mean_position_delta < 0 && self.current_position > self.desired_position)
    }

    /// Inside the target band. For a target on a bound, anything past the
    /// bound counts as well.
    fn in_target_band(&self) -> bool {
        let offset = i32::from(self.current_position) - i32::from(self.desired_position);
        let threshold = i32::from(DOOR_THRESHOLD);
        if self.desired_position >= self.bounds.max() {
            offset >= -threshold
        } else if self.desired_position <= self.bounds.min() {
            offset <= threshold
        } else {
            // Inclusive on both edges
            offset.abs() <= threshold
        }
    }

    fn press(&mut self, now: u32, state: DoorState) {
        self.drive_relay(true);
        self.relay_time = now.wrapping_add(RELAY_DELAY);
        self.command_time = now.wrapping_add(DOOR_COMMAND_DELAY);
        self.stabilize_count = match state {
            DoorState::Stop => STOP_STABILIZE_COUNT,
            _ => START_STABILIZE_COUNT,
        };
    }

    fn drive_relay(&mut self, high: bool) {
        self.relay.set_relay(high);
        self.relay_output = high;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.bounds.to_percent(self.current_position),
            state: self.current_state,
            result: self.result,
        }
    }

    /// Write the current [`Snapshot`] to `buf`, returning the byte count.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        self.snapshot().encode(buf)
    }

    pub fn current_state(&self) -> DoorState {
        self.current_state
    }

    pub fn desired_state(&self) -> DoorState {
        self.desired_state
    }

    pub fn result(&self) -> MoveResult {
        self.result
    }

    pub fn current_position(&self) -> i16 {
        self.current_position
    }

    pub fn desired_position(&self) -> i16 {
        self.desired_position
    }

    pub fn bounds(&self) -> PositionBounds {
        self.bounds
    }

    pub fn mean_position_delta(&self) -> i8 {
        self.mean_position_delta
    }

    pub fn relay_output(&self) -> bool {
        self.relay_output
    }
}

/// One step of exponential smoothing with factor 0.5, rounding down.
fn smooth(mean: i8, difference: i32) -> i8 {
    let next = (i32::from(mean) + difference) >> 1;
    next.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::sim::{Bench, Direction, DoorModel, Motion};

    macro_rules! assert_settled {
        ($bench:expr, $result:expr) => {{
            assert_eq!($bench.door.current_state(), DoorState::Idle);
            assert_eq!($bench.door.desired_state(), DoorState::Idle);
            assert_eq!($bench.door.result(), $result);
            assert!(!$bench.door.relay_output());
        }};
    }

    const TIMEOUT_MS: u32 = 60_000;

    fn bounds() -> PositionBounds {
        PositionBounds::new(100, 3900).unwrap()
    }

    /// Door resting half way down, the next press opens it.
    fn model() -> RefCell<DoorModel> {
        RefCell::new(DoorModel::new(500, 50, 4000, 120))
    }

    fn fields<'a>(
        door: &crate::sim::SimController<'a>,
    ) -> (DoorState, DoorState, MoveResult, i16, i16, i8, bool, u32, u32, u32, u8) {
        (
            door.current_state,
            door.desired_state,
            door.result,
            door.current_position,
            door.desired_position,
            door.mean_position_delta,
            door.relay_output,
            door.time_stamp,
            door.command_time,
            door.relay_time,
            door.stabilize_count,
        )
    }

    #[test]
    fn test_initial_state() {
        let model = model();
        let clock = Cell::new(0);
        let bench = Bench::new(&model, &clock, bounds());
        assert_eq!(bench.door.current_state(), DoorState::Idle);
        assert_eq!(bench.door.desired_state(), DoorState::Idle);
        assert_eq!(bench.door.result(), MoveResult::None);
        assert_eq!(bench.door.current_position(), 500);
        assert_eq!(bench.door.desired_position(), 500);
        assert!(!bench.door.relay_output());
    }

    #[test]
    fn test_smooth() {
        assert_eq!(smooth(0, 0), 0);
        assert_eq!(smooth(0, -3), -2);
        assert_eq!(smooth(-2, -4), -3);
        assert_eq!(smooth(4, 0), 2);
        // Arithmetic shift keeps -1 at -1
        assert_eq!(smooth(-1, 0), -1);
        assert_eq!(smooth(1, 0), 0);
        // Saturates instead of wrapping
        assert_eq!(smooth(100, 1000), i8::MAX);
        assert_eq!(smooth(-100, -1000), i8::MIN);
    }

    #[test]
    fn test_tick_motion_flag() {
        assert_eq!(Tick::NotSampled.motion_flag(), 0);
        assert_eq!(Tick::Still.motion_flag(), 0);
        assert_eq!(Tick::Moving.motion_flag(), 1);
        let transition = Tick::Transition {
            from: DoorState::Idle,
            to: DoorState::Active,
        };
        assert_eq!(transition.motion_flag(), 1);
    }

    #[test]
    fn test_set_target_maps_percent() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(50);
        assert_eq!(bench.door.desired_position(), 2000);
        assert_eq!(bench.door.desired_state(), DoorState::Active);
        assert_eq!(bench.door.result(), MoveResult::None);
        // Still idle until the next sample
        assert_eq!(bench.door.current_state(), DoorState::Idle);
    }

    #[test]
    fn test_idle_never_pulses() {
        let model = RefCell::new(DoorModel::new(500, 50, 4000, 120).with_noise(1));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.run_for(10_000);
        assert_eq!(bench.model().presses(), 0);
        assert_settled!(bench, MoveResult::None);
    }

    #[test]
    fn test_closed_gate_mutates_nothing() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        assert!(matches!(bench.step(), Tick::Transition { .. }));

        let before = fields(&bench.door);
        for _ in 0..5 {
            assert_eq!(bench.door.execute(), Tick::NotSampled);
        }
        assert_eq!(fields(&bench.door), before);
    }

    #[test]
    fn test_start_pulses_for_relay_delay() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);

        assert_eq!(
            bench.step(),
            Tick::Transition {
                from: DoorState::Idle,
                to: DoorState::Active
            }
        );
        assert!(bench.run_until(DOOR_SAMPLE_RATE, |door| door.current_state()
            == DoorState::Start));
        assert!(bench.door.relay_output());
        assert_eq!(bench.model().presses(), 1);

        bench.run_for(RELAY_DELAY - 1);
        assert!(bench.door.relay_output());
        bench.step();
        assert!(!bench.door.relay_output());
        assert!(!bench.model().relay_high());
        assert_eq!(bench.model().presses(), 1);
    }

    #[test]
    fn test_target_in_band_goes_idle_without_pulse() {
        let model = RefCell::new(DoorModel::new(2010, 50, 4000, 120));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(50);
        bench.run_for(200);
        assert_eq!(bench.model().presses(), 0);
        assert_settled!(bench, MoveResult::None);
    }

    #[test]
    fn test_past_bound_counts_as_arrived() {
        // Resting at the open limit switch, beyond the calibrated bound
        let model = RefCell::new(DoorModel::new(3950, 50, 3950, 120).with_noise(1));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        bench.run_for(1000);
        assert_eq!(bench.model().presses(), 0);
        assert_settled!(bench, MoveResult::None);
    }

    #[test]
    fn test_open_to_bound_ends_idle() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);

        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));
        assert!(bench.run_until(TIMEOUT_MS, |door| door.result() != MoveResult::None));
        assert_settled!(bench, MoveResult::Success);

        // Only the start press, the limit switch stops the motor
        assert_eq!(bench.model().presses(), 1);
        assert!(bench.door.current_position() >= 3900 - DOOR_THRESHOLD);
        bench.run_for(TIMEOUT_MS);
        assert_eq!(bench.model().motion(), Motion::Stopped);
        assert_eq!(bench.model().position(), 4000);
        assert_eq!(bench.model().presses(), 1);
    }

    #[test]
    fn test_interior_target_stops_door() {
        let model = RefCell::new(DoorModel::new(500, 50, 4000, 120).with_noise(1));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(50);

        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Stop));
        assert_eq!(bench.door.result(), MoveResult::Success);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Idle));
        assert_settled!(bench, MoveResult::Success);

        assert_eq!(bench.model().presses(), 2);
        assert_eq!(bench.model().motion(), Motion::Stopped);
        let position = bench.model().position();
        assert!((position - 2000).abs() <= DOOR_THRESHOLD + 5, "stopped at {}", position);
        assert!(bench.door.snapshot().position.abs_diff(50) <= 1);
    }

    #[test]
    fn test_stop_holds_while_door_moves() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(50);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));

        // The opener misses the stop press and keeps going
        bench.model_mut().miss_next_press();
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Stop));
        assert_eq!(bench.model().motion(), Motion::Moving(Direction::Opening));
        bench.run_for(1000);
        assert_eq!(bench.door.current_state(), DoorState::Stop);
        assert_eq!(bench.model().presses(), 2);

        // Released only after STOP_STABILIZE_COUNT still samples
        bench.model_mut().jam();
        bench.run_for(u32::from(STOP_STABILIZE_COUNT - 1) * DOOR_SAMPLE_RATE);
        assert_eq!(bench.door.current_state(), DoorState::Stop);
        assert!(bench.run_until(1000, |door| door.current_state() == DoorState::Active));
        assert_eq!(bench.model().presses(), 2);
    }

    #[test]
    fn test_wrong_direction_is_corrected() {
        let model = RefCell::new(DoorModel::new(2000, 50, 4000, 120).heading(Direction::Closing));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);

        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));
        assert_eq!(bench.model().motion(), Motion::Moving(Direction::Opening));
        assert!(bench.run_until(TIMEOUT_MS, |door| door.result() != MoveResult::None));
        assert_settled!(bench, MoveResult::Success);

        // Closing, stopped, then opening
        assert_eq!(bench.model().presses(), 3);
    }

    #[test]
    fn test_reversal_releases_control() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));
        bench.run_for(1000);
        assert_eq!(bench.door.current_state(), DoorState::Monitor);

        // Obstruction, the opener reverses on its own
        bench.model_mut().reverse();
        assert!(bench.run_until(1000, |door| door.current_state() == DoorState::Idle));
        assert_settled!(bench, MoveResult::Fail);

        bench.run_for(TIMEOUT_MS);
        assert_eq!(bench.model().presses(), 1);
        assert_eq!(bench.model().position(), 50);
        assert_settled!(bench, MoveResult::Fail);
    }

    #[test]
    fn test_stall_releases_control() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));
        bench.run_for(1000);

        bench.model_mut().jam();
        assert!(bench.run_until(1000, |door| door.current_state() == DoorState::Idle));
        assert_settled!(bench, MoveResult::Fail);
        assert_eq!(bench.model().presses(), 1);
    }

    #[test]
    fn test_new_target_supersedes_move() {
        let model = model();
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Monitor));
        bench.run_for(1000);

        // Heading away from the new target must not count as a failure
        bench.door.set_target(0);
        let tick = loop {
            match bench.step() {
                Tick::NotSampled => continue,
                tick => break tick,
            }
        };
        assert_eq!(
            tick,
            Tick::Transition {
                from: DoorState::Monitor,
                to: DoorState::Active
            }
        );
        assert_eq!(bench.door.result(), MoveResult::None);

        assert!(bench.run_until(TIMEOUT_MS, |door| door.result() != MoveResult::None));
        assert_settled!(bench, MoveResult::Success);
        assert!(bench.door.current_position() <= 100 + DOOR_THRESHOLD);
    }

    #[test]
    fn test_calibration() {
        let model = RefCell::new(DoorModel::new(50, 50, 4000, 120));
        let clock = Cell::new(0);
        let mut bench = Bench::new(&model, &clock, PositionBounds::default());

        assert_eq!(bench.door.calibrate_min(), 50 + DOOR_THRESHOLD);

        // Open by hand up to the limit switch
        bench.model_mut().press();
        bench.run_for(TIMEOUT_MS);
        assert_eq!(bench.model().position(), 4000);
        assert_eq!(bench.door.current_position(), 4000);
        assert_eq!(bench.door.calibrate_max(), 4000 - DOOR_THRESHOLD);
        assert_eq!(bench.door.bounds(), PositionBounds::new(85, 3965).unwrap());
        // Calibration never touches the relay
        assert_eq!(bench.model().presses(), 1);
        assert_settled!(bench, MoveResult::None);

        bench.door.set_target(0);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.result() != MoveResult::None));
        assert_settled!(bench, MoveResult::Success);
        assert_eq!(bench.door.snapshot().position, 0);
    }

    #[test]
    fn test_encode() {
        let model = RefCell::new(DoorModel::new(2000, 50, 4000, 120));
        let clock = Cell::new(0);
        let bench = Bench::new(&model, &clock, bounds());
        let mut buf = [0u8; 4];
        assert_eq!(bench.door.encode(&mut buf), Ok(4));
        assert_eq!(buf, [0x80, 50, 4, 0]);
    }

    #[test]
    fn test_deadlines_survive_wraparound() {
        let model = model();
        let clock = Cell::new(u32::MAX - 50);
        let mut bench = Bench::new(&model, &clock, bounds());
        bench.door.set_target(100);
        assert!(bench.run_until(TIMEOUT_MS, |door| door.current_state() == DoorState::Start));
        assert!(bench.door.relay_output());

        // The release deadline lies past the wrap
        bench.run_for(RELAY_DELAY);
        assert!(bench.now() < RELAY_DELAY);
        assert!(!bench.door.relay_output());

        assert!(bench.run_until(TIMEOUT_MS, |door| door.result() != MoveResult::None));
        assert_settled!(bench, MoveResult::Success);
        assert_eq!(bench.model().presses(), 1);
    }
}
