//! Error types for the dispatch engine.
//!
//! Validation and resource errors are returned to the direct caller. Operational
//! conditions (overload, door obstruction) are also reported as alarms in the
//! car status, since they persist across ticks.

use crate::shared::{CarId, CarState, Floor};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Floor outside the building range
    #[error("Floor {floor} is outside the building range [{min}, {max}]")]
    InvalidFloor { floor: Floor, min: Floor, max: Floor },

    /// No car with the given id
    #[error("No car with id {0}")]
    InvalidCarId(CarId),

    /// Hall calls must say where the rider is going
    #[error("Hall calls need an up or down direction")]
    InvalidDirection,

    /// Operation not allowed in the car's current state
    #[error("Car {car_id} cannot {action} while {state:?}")]
    InvalidTransition {
        car_id: CarId,
        state: CarState,
        action: &'static str,
    },

    /// Every car is in emergency or maintenance
    #[error("No car is available to serve the request")]
    NoAvailableCar,

    /// Load above the car limits, motion is blocked until it clears
    #[error("Car {car_id} is overloaded: {passengers} passengers / {load_kg} kg (limits {max_capacity} / {max_weight_kg} kg)")]
    Overweight {
        car_id: CarId,
        passengers: u32,
        load_kg: u32,
        max_capacity: u32,
        max_weight_kg: u32,
    },

    #[error("Door close failed: obstruction detected")]
    DoorObstructed,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
