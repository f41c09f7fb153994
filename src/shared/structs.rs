/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::errors::{ConfigError, Error, Result};

/***************************************/
/*       Public data structures        */
/***************************************/
pub type Floor = i32;
pub type CarId = usize;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CarState {
    Moving,
    Stopped,
    Maintenance,
    Emergency,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Open,
    Closed,
}

/// Continuous conditions a car reports through its status rather than as errors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alarm {
    Overweight,
    Obstruction,
}

/**
 * Floor range served by every car in the building.
 *
 * # Fields
 * - `min_floor`:   Lowest floor (may be negative for basements).
 * - `max_floor`:   Highest floor.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    pub min_floor: Floor,
    pub max_floor: Floor,
}

impl Building {
    /// Largest floor span a building may have.
    pub const MAX_FLOORS: u32 = 10_000;

    pub fn new(min_floor: Floor, max_floor: Floor) -> Building {
        Building {
            min_floor,
            max_floor,
        }
    }

    /// Building with `n_floors` floors numbered from 0.
    pub fn with_floors(n_floors: u32) -> Building {
        let top = Floor::try_from(n_floors).unwrap_or(Floor::MAX);
        Building::new(0, top.saturating_sub(1))
    }

    pub fn contains(&self, floor: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    pub fn check(&self, floor: Floor) -> Result<()> {
        if self.contains(floor) {
            Ok(())
        } else {
            Err(Error::InvalidFloor {
                floor,
                min: self.min_floor,
                max: self.max_floor,
            })
        }
    }

    /// At least two floors and no more than `MAX_FLOORS`.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_floor >= self.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor ({}) must be below max_floor ({})",
                self.min_floor, self.max_floor
            )));
        }
        if self.n_floors() > Building::MAX_FLOORS {
            return Err(ConfigError::Invalid(format!(
                "a building spans at most {} floors, got {}",
                Building::MAX_FLOORS,
                self.n_floors()
            )));
        }
        Ok(())
    }

    pub fn n_floors(&self) -> u32 {
        let span = i64::from(self.max_floor) - i64::from(self.min_floor) + 1;
        span.clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Read-only snapshot of a car, handed to display and logging collaborators.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarStatus {
    #[serde(rename = "carId")]
    pub car_id: CarId,
    #[serde(rename = "currentFloor")]
    pub current_floor: Floor,
    pub direction: Direction,
    pub state: CarState,
    pub door: DoorState,
    #[serde(rename = "upStops")]
    pub up_stops: Vec<Floor>,
    #[serde(rename = "downStops")]
    pub down_stops: Vec<Floor>,
    pub passengers: u32,
    #[serde(rename = "loadKg")]
    pub load_kg: u32,
    pub alarms: Vec<Alarm>,
}

impl CarStatus {
    pub fn is_idle(&self) -> bool {
        self.state == CarState::Stopped && self.up_stops.is_empty() && self.down_stops.is_empty()
    }
}
