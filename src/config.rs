/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatch::StrategyKind;
use crate::elevator::CarSpec;
use crate::errors::ConfigError;
use crate::shared::{Building, Floor};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub building: BuildingConfig,
    #[serde(default)]
    pub car: CarConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BuildingConfig {
    pub n_cars: usize,
    pub min_floor: Floor,
    pub max_floor: Floor,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CarConfig {
    pub max_capacity: u32,
    pub max_weight_kg: u32,
    pub door_close_retry_ticks: u32,
    pub door_max_close_attempts: u32,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DispatchConfig {
    pub strategy: StrategyKind,
    /// Age after which a hall call bypasses normal cost ranking (seconds)
    pub starvation_threshold_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock period of one simulation tick (milliseconds)
    pub tick_ms: u64,
}

/***************************************/
/*              Defaults               */
/***************************************/
impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            n_cars: 3,
            min_floor: 0,
            max_floor: 9,
        }
    }
}

impl Default for CarConfig {
    fn default() -> Self {
        let spec = CarSpec::default();
        CarConfig {
            max_capacity: spec.max_capacity,
            max_weight_kg: spec.max_weight_kg,
            door_close_retry_ticks: spec.door_close_retry_ticks,
            door_max_close_attempts: spec.door_max_close_attempts,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            strategy: StrategyKind::Nearest,
            starvation_threshold_secs: 60,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig { tick_ms: 1000 }
    }
}

/***************************************/
/*             Public API              */
/***************************************/
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.building.n_cars == 0 {
            return Err(ConfigError::Invalid("building.n_cars must be at least 1".into()));
        }
        self.building().validate()?;
        if self.car.max_capacity == 0 || self.car.max_weight_kg == 0 {
            return Err(ConfigError::Invalid("car limits must be positive".into()));
        }
        if self.car.door_max_close_attempts == 0 {
            return Err(ConfigError::Invalid(
                "car.door_max_close_attempts must be at least 1".into(),
            ));
        }
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::Invalid("simulation.tick_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn building(&self) -> Building {
        Building::new(self.building.min_floor, self.building.max_floor)
    }

    pub fn car_spec(&self) -> CarSpec {
        CarSpec {
            max_capacity: self.car.max_capacity,
            max_weight_kg: self.car.max_weight_kg,
            door_close_retry_ticks: self.car.door_close_retry_ticks,
            door_max_close_attempts: self.car.door_max_close_attempts,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_ms)
    }
}

impl DispatchConfig {
    pub fn starvation_threshold(&self) -> Duration {
        Duration::from_secs(self.starvation_threshold_secs)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(config_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    config_str.parse()
}
