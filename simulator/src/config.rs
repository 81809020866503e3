use std::{fs::File, io::Read, path::Path};

use anyhow::{bail, Context};
use door_control::{
    position::{DEFAULT_POSITION_MAX, DEFAULT_POSITION_MIN},
    sim::{Direction, DoorModel},
    PositionBounds,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RawConfig {
    pub door: Door,
    pub controller: RawController,
    pub scenario: RawScenario,
}

impl RawConfig {
    /// Parse the config file at the specified path.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file at {:?}", path))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context("Failed to read config file to string")?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn example() -> Self {
        Self {
            door: Door {
                closed_limit: 150,
                open_limit: 3900,
                start_position: 150,
                speed: 120,
                noise: 1,
                heading: Heading::Opening,
            },
            controller: RawController {
                position_min: None,
                position_max: None,
                calibrate: true,
            },
            scenario: RawScenario {
                timeout_secs: 120,
                moves: vec![
                    Move {
                        target: 100,
                        obstruction: None,
                    },
                    Move {
                        target: 50,
                        obstruction: None,
                    },
                    Move {
                        target: 0,
                        obstruction: Some(Obstruction {
                            after_ms: 5000,
                            kind: ObstructionKind::Reverse,
                        }),
                    },
                ],
            },
        }
    }
}

/// The simulated door.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Door {
    /// Reading at the closed limit switch
    pub closed_limit: i16,

    /// Reading at the open limit switch
    pub open_limit: i16,

    /// Reading at startup
    pub start_position: i16,

    /// Travel speed in raw units per second
    pub speed: u16,

    /// Alternating jitter added to every reading
    #[serde(default)]
    pub noise: i16,

    /// Direction of the first press
    #[serde(default)]
    pub heading: Heading,
}

impl Door {
    pub fn model(&self) -> DoorModel {
        DoorModel::new(
            self.start_position,
            self.closed_limit,
            self.open_limit,
            self.speed,
        )
        .with_noise(self.noise)
        .heading(self.heading.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    Opening,
    Closing,
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Opening => Direction::Opening,
            Heading::Closing => Direction::Closing,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RawController {
    /// Raw reading for 0 %, defaults to the ADC minimum
    pub position_min: Option<i16>,

    /// Raw reading for 100 %, defaults to the ADC maximum
    pub position_max: Option<i16>,

    /// Calibrate by driving the door to both limit switches first
    #[serde(default)]
    pub calibrate: bool,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RawScenario {
    /// Maximum duration of a single move
    pub timeout_secs: u32,

    /// Targets to move to, in order
    pub moves: Vec<Move>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Move {
    /// Target position in percent
    pub target: u8,

    #[serde(default)]
    pub obstruction: Option<Obstruction>,
}

/// Something that disturbs the door during a move.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Obstruction {
    /// Time since the move was commanded
    pub after_ms: u32,

    pub kind: ObstructionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstructionKind {
    /// The opener reverses on its own
    Reverse,
    /// The door stops without reversing
    Jam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Fixed(PositionBounds),
    Calibrate,
}

#[derive(Debug)]
pub struct Config {
    pub door: Door,
    pub bounds: Bounds,
    pub timeout_ms: u32,
    pub moves: Vec<Move>,
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw_config: RawConfig) -> Result<Self, Self::Error> {
        // Validate door
        let door = raw_config.door;
        if door.closed_limit >= door.open_limit {
            bail!(
                "Closed limit {} must be below open limit {}",
                door.closed_limit,
                door.open_limit
            );
        }
        if !(door.closed_limit..=door.open_limit).contains(&door.start_position) {
            bail!(
                "Start position {} lies outside the limit switches",
                door.start_position
            );
        }
        if door.speed == 0 {
            bail!("Door speed must not be zero");
        }

        // Validate controller
        let controller = raw_config.controller;
        let bounds = match (controller.calibrate, controller.position_min, controller.position_max) {
            (true, None, None) => Bounds::Calibrate,
            (true, _, _) => bail!("Either calibrate or set position bounds, not both"),
            (false, min, max) => {
                let min = min.unwrap_or(DEFAULT_POSITION_MIN);
                let max = max.unwrap_or(DEFAULT_POSITION_MAX);
                let bounds = PositionBounds::new(min, max).with_context(|| {
                    format!("Position min {} must be below position max {}", min, max)
                })?;
                Bounds::Fixed(bounds)
            }
        };

        // Validate scenario
        let scenario = raw_config.scenario;
        if scenario.moves.is_empty() {
            bail!("Scenario has no moves");
        }
        if let Some(m) = scenario.moves.iter().find(|m| m.target > 100) {
            bail!("Target {}% is out of range [0-100]", m.target);
        }
        let timeout_ms = scenario
            .timeout_secs
            .checked_mul(1000)
            .context("Scenario timeout too large")?;

        Ok(Config {
            door,
            bounds,
            timeout_ms,
            moves: scenario.moves,
        })
    }
}
