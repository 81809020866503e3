//! Drive the simulated door through the configured moves.

use std::cell::{Cell, RefCell};

use anyhow::bail;
use door_control::{
    controller::DOOR_COMMAND_DELAY,
    sim::{Bench, Direction, Motion},
    DoorState, MoveResult, PositionBounds, Snapshot, Tick,
};

use crate::config::{Bounds, Config, Move, ObstructionKind};

/// How a single move ended.
#[derive(Debug)]
pub struct Outcome {
    pub target: u8,
    pub result: MoveResult,
    /// Time from the command until door and controller were at rest
    pub elapsed_ms: u32,
    /// Relay presses issued for this move
    pub presses: u32,
    pub snapshot: Snapshot,
}

pub fn run(config: &Config) -> anyhow::Result<Vec<Outcome>> {
    let model = RefCell::new(config.door.model());
    let clock = Cell::new(0);
    let bounds = match config.bounds {
        Bounds::Fixed(bounds) => bounds,
        Bounds::Calibrate => PositionBounds::default(),
    };
    let mut bench = Bench::new(&model, &clock, bounds);

    if config.bounds == Bounds::Calibrate {
        calibrate(&mut bench, config.timeout_ms)?;
    }

    config
        .moves
        .iter()
        .map(|m| run_move(&mut bench, m, config.timeout_ms))
        .collect()
}

/// Drive the door by hand to both limit switches and calibrate there.
///
/// The controller keeps the calibrated bounds. Fails if they came out empty.
fn calibrate(bench: &mut Bench<'_>, timeout_ms: u32) -> anyhow::Result<()> {
    drive_to_limit(bench, Direction::Closing, timeout_ms)?;
    let min = bench.door.calibrate_min();
    drive_to_limit(bench, Direction::Opening, timeout_ms)?;
    let max = bench.door.calibrate_max();

    if PositionBounds::new(min, max).is_none() {
        bail!("Calibration produced empty bounds {} to {}", min, max);
    }
    tracing::info!("Calibrated bounds: {} to {}", min, max);
    Ok(())
}

fn drive_to_limit(
    bench: &mut Bench<'_>,
    direction: Direction,
    timeout_ms: u32,
) -> anyhow::Result<()> {
    // Each press toggles between moving and stopped, so a reversal takes two
    for _ in 0..4 {
        let done = {
            let model = bench.model();
            model.motion() == Motion::Moving(direction) || model.at_limit(direction)
        };
        if done {
            break;
        }
        bench.model_mut().press();
        bench.run_for(DOOR_COMMAND_DELAY);
    }

    if !wait_for_rest(bench, timeout_ms) {
        bail!("Door did not reach the {:?} limit", direction);
    }
    tracing::debug!(
        "Reached {:?} limit at {}",
        direction,
        bench.door.current_position()
    );
    Ok(())
}

/// Step until the model stopped and the controller sampled the final position.
fn wait_for_rest(bench: &mut Bench<'_>, timeout_ms: u32) -> bool {
    let mut still_since: Option<u32> = None;
    for _ in 0..timeout_ms {
        bench.step();
        let stopped = bench.model().motion() == Motion::Stopped;
        match (stopped, still_since) {
            (false, _) => still_since = None,
            (true, None) => still_since = Some(bench.now()),
            (true, Some(since)) => {
                if bench.now().wrapping_sub(since) > DOOR_COMMAND_DELAY {
                    return true;
                }
            }
        }
    }
    false
}

fn run_move(bench: &mut Bench<'_>, m: &Move, timeout_ms: u32) -> anyhow::Result<Outcome> {
    let presses_before = bench.model().presses();
    tracing::info!(
        "Moving to {}% from {}",
        m.target,
        bench.door.snapshot().position
    );
    bench.door.set_target(m.target);

    let mut elapsed_ms = 0;
    loop {
        if elapsed_ms >= timeout_ms {
            bail!(
                "Move to {}% did not finish within {} ms (state {:?})",
                m.target,
                timeout_ms,
                bench.door.current_state()
            );
        }

        if let Some(obstruction) = &m.obstruction {
            if obstruction.after_ms == elapsed_ms {
                tracing::info!("Obstruction: {:?}", obstruction.kind);
                match obstruction.kind {
                    ObstructionKind::Reverse => bench.model_mut().reverse(),
                    ObstructionKind::Jam => bench.model_mut().jam(),
                }
            }
        }

        if let Tick::Transition { from, to } = bench.step() {
            tracing::debug!(
                "State transition: {:?} -> {:?} at {}",
                from,
                to,
                bench.door.current_position()
            );
        }
        elapsed_ms += 1;

        let settled = bench.door.current_state() == DoorState::Idle
            && bench.door.desired_state() == DoorState::Idle
            && bench.model().motion() == Motion::Stopped;
        if settled {
            break;
        }
    }

    Ok(Outcome {
        target: m.target,
        result: bench.door.result(),
        elapsed_ms,
        presses: bench.model().presses() - presses_before,
        snapshot: bench.door.snapshot(),
    })
}
